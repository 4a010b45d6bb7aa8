use anyhow::Result;
use sqlx::PgPool;
use time::Date;

/// Static descriptors for one metered site, as carried by the geospatial
/// store or the CSV catalog export. `meter_id` is the join key against the
/// telemetry rows.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SiteRow {
    pub meter_id: String,
    pub customer_id: Option<String>,
    pub property_id: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub tariff_class: Option<String>,
    pub activity: Option<String>,
    pub comm_method: Option<String>,
    pub installed_on: Option<Date>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Fetch the full site catalog. The catalog is small (one row per meter),
/// so the join against telemetry happens in the data-access layer rather
/// than in cross-database SQL.
pub async fn site_catalog(pool: &PgPool) -> Result<Vec<SiteRow>> {
    let rows = sqlx::query_as::<_, SiteRow>(
        r#"
        SELECT
            meter_id,
            customer_id,
            property_id,
            name,
            address,
            district,
            tariff_class,
            activity,
            comm_method,
            installed_on,
            latitude,
            longitude
        FROM meter_sites
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
