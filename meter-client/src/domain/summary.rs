use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// Aggregated view of one meter over a query window.
///
/// Built fresh for every query from that window's readings and discarded
/// after rendering; never persisted. `consumption_total` sums the window,
/// the `last_reading_*` pair comes from the newest reading, and the static
/// descriptors come from whichever group member the configured reducer
/// picked (see `aggregate::StaticFieldReducer`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterSummary {
    pub meter_id: String,
    pub consumption_total: f64,
    /// Number of readings that fed this summary.
    pub reading_count: usize,
    pub last_reading_value: Option<f64>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_reading_at: Option<OffsetDateTime>,
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

impl MeterSummary {
    /// Coordinates usable for map plotting.
    ///
    /// Summaries with missing, non-finite, or (0, 0) coordinates stay in the
    /// result set for tables and widgets; only map consumers filter on this.
    pub fn map_position(&self) -> Option<(f64, f64)> {
        let lat = self.latitude?;
        let lon = self.longitude?;
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        // The stores encode "no location" as a zeroed coordinate pair.
        if lat == 0.0 && lon == 0.0 {
            return None;
        }
        Some((lat, lon))
    }
}
