use std::collections::HashMap;

use async_trait::async_trait;
use meter_client::db::{reading_queries, site_queries, ConsumptionRow, SiteRow};
use meter_client::domain::Reading;
use sqlx::{MySqlPool, PgPool};

use crate::sanitize;
use crate::store::{CsvSiteCatalog, QueryWindow, ReadingStore, StoreError};

/// Source of the static site descriptors joined onto telemetry rows.
pub enum SiteCatalog {
    /// The geospatial store's site table.
    Gis(PgPool),
    /// A CSV export loaded at startup.
    Csv(CsvSiteCatalog),
}

impl SiteCatalog {
    async fn rows(&self) -> Result<Vec<SiteRow>, StoreError> {
        match self {
            SiteCatalog::Gis(pool) => site_queries::site_catalog(pool)
                .await
                .map_err(|e| StoreError::Catalog(e.to_string())),
            SiteCatalog::Csv(catalog) => Ok(catalog.rows().to_vec()),
        }
    }
}

/// Data-access layer over the two external stores: consumption rows from
/// the telemetry database, site descriptors from the catalog source.
pub struct SqlReadingStore {
    telemetry: MySqlPool,
    sites: SiteCatalog,
}

impl SqlReadingStore {
    pub fn new(telemetry: MySqlPool, sites: SiteCatalog) -> Self {
        Self { telemetry, sites }
    }
}

#[async_trait]
impl ReadingStore for SqlReadingStore {
    async fn fetch_window(&self, window: &QueryWindow) -> Result<Vec<Reading>, StoreError> {
        let consumption = reading_queries::consumption_window(&self.telemetry, window.start, window.end)
            .await
            .map_err(|e| StoreError::Telemetry(e.to_string()))?;
        let sites = self.sites.rows().await?;

        let by_meter: HashMap<String, SiteRow> =
            sites.into_iter().map(|s| (s.meter_id.clone(), s)).collect();
        let mut rows = join_rows(consumption, &by_meter);

        if let Some(district) = &window.district {
            rows.retain(|r| r.district.as_deref() == Some(district.as_str()));
        }

        tracing::info!(
            rows = rows.len(),
            district = window.district.as_deref().unwrap_or("*"),
            "fetched readings for window"
        );
        Ok(sanitize::sanitize_all(rows))
    }

    async fn meter_history(
        &self,
        meter_id: &str,
        window: &QueryWindow,
    ) -> Result<Vec<ConsumptionRow>, StoreError> {
        reading_queries::meter_history(&self.telemetry, meter_id, window.start, window.end)
            .await
            .map_err(|e| StoreError::Telemetry(e.to_string()))
    }
}

/// Left join: every telemetry row survives, with descriptors from the site
/// catalog where the meter is known and nulls where it is not.
fn join_rows(consumption: Vec<ConsumptionRow>, sites: &HashMap<String, SiteRow>) -> Vec<Reading> {
    consumption
        .into_iter()
        .map(|c| {
            let site = sites.get(&c.meter_id);
            Reading {
                meter_id: c.meter_id,
                ts: c.ts,
                consumption: c.consumption,
                reading_value: c.reading_value,
                customer_id: site.and_then(|s| s.customer_id.clone()),
                property_id: site.and_then(|s| s.property_id.clone()),
                name: site.and_then(|s| s.name.clone()),
                address: site.and_then(|s| s.address.clone()),
                district: site.and_then(|s| s.district.clone()),
                tariff_class: site.and_then(|s| s.tariff_class.clone()),
                activity: site.and_then(|s| s.activity.clone()),
                comm_method: site.and_then(|s| s.comm_method.clone()),
                installed_on: site.and_then(|s| s.installed_on),
                latitude: site.and_then(|s| s.latitude),
                longitude: site.and_then(|s| s.longitude),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn consumption_row(meter: &str) -> ConsumptionRow {
        ConsumptionRow {
            meter_id: meter.to_string(),
            ts: datetime!(2026-02-01 00:00:00 UTC),
            consumption: Some(1.0),
            reading_value: Some(10.0),
        }
    }

    fn site_row(meter: &str, district: &str) -> SiteRow {
        SiteRow {
            meter_id: meter.to_string(),
            customer_id: Some("C-1".to_string()),
            property_id: None,
            name: Some("Site".to_string()),
            address: None,
            district: Some(district.to_string()),
            tariff_class: Some("DOMESTICO A".to_string()),
            activity: None,
            comm_method: None,
            installed_on: None,
            latitude: Some(21.88),
            longitude: Some(-102.29),
        }
    }

    #[test]
    fn join_keeps_telemetry_rows_without_a_site() {
        let mut sites = HashMap::new();
        sites.insert("M1".to_string(), site_row("M1", "NORTE"));

        let rows = join_rows(vec![consumption_row("M1"), consumption_row("M2")], &sites);
        assert_eq!(rows.len(), 2);

        let m1 = rows.iter().find(|r| r.meter_id == "M1").unwrap();
        assert_eq!(m1.district.as_deref(), Some("NORTE"));
        assert_eq!(m1.latitude, Some(21.88));

        let m2 = rows.iter().find(|r| r.meter_id == "M2").unwrap();
        assert_eq!(m2.district, None);
        assert_eq!(m2.latitude, None);
    }

    #[test]
    fn join_carries_consumption_through_untouched() {
        let sites = HashMap::new();
        let rows = join_rows(vec![consumption_row("M1")], &sites);
        assert_eq!(rows[0].consumption, Some(1.0));
        assert_eq!(rows[0].reading_value, Some(10.0));
        assert_eq!(rows[0].ts, datetime!(2026-02-01 00:00:00 UTC));
    }
}
