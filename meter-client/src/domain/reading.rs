use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// One telemetry record for a meter: a consumption row from the telemetry
/// store joined against the site catalog. Owned by the external stores and
/// read-only to everything downstream of the data-access layer.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reading {
    pub meter_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub ts: OffsetDateTime,
    /// Consumption over the row's period, in m3. `None` when the store held
    /// null or boundary sanitation dropped the value.
    pub consumption: Option<f64>,
    /// Register value at `ts`.
    pub reading_value: Option<f64>,
    pub customer_id: Option<String>,
    pub property_id: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub district: Option<String>,
    /// Raw tariff label as the billing system writes it, e.g. "DOMESTICO A".
    pub tariff_class: Option<String>,
    /// Business-activity category of the property.
    pub activity: Option<String>,
    pub comm_method: Option<String>,
    pub installed_on: Option<Date>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
