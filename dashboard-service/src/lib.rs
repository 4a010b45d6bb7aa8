pub mod config;
pub mod http;
pub mod metrics_server;
pub mod observability;
pub mod sanitize;
pub mod snapshot;
pub mod store;

pub use snapshot::{build_snapshot, MeterStatus, Snapshot};
pub use store::{QueryWindow, ReadingStore};
