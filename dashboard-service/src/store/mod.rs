pub mod cache;
pub mod csv_sites;
pub mod sql;

pub use cache::CachedReadingStore;
pub use csv_sites::CsvSiteCatalog;
pub use sql::{SiteCatalog, SqlReadingStore};

use async_trait::async_trait;
use meter_client::db::ConsumptionRow;
use meter_client::domain::Reading;
use time::OffsetDateTime;

/// Parameters of one dashboard query. Equality and hashing are what the
/// cache layer keys on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryWindow {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
    /// Restrict to one district; `None` means city-wide.
    pub district: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("telemetry store error: {0}")]
    Telemetry(String),
    #[error("site catalog error: {0}")]
    Catalog(String),
}

/// Seam between the dashboard logic and the external stores. Everything a
/// store hands out has already been through boundary sanitation.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Joined rows for the window. A window with no rows is an empty Vec,
    /// not an error.
    async fn fetch_window(&self, window: &QueryWindow) -> Result<Vec<Reading>, StoreError>;

    /// Time-ordered history for one meter, for the detail charts. The
    /// window's district filter does not apply here.
    async fn meter_history(
        &self,
        meter_id: &str,
        window: &QueryWindow,
    ) -> Result<Vec<ConsumptionRow>, StoreError>;
}
