pub mod aggregate;
pub mod classify;
pub mod db;
pub mod domain;

pub use aggregate::{aggregate, top_consumers, StaticFieldReducer};
pub use classify::{classify, ConsumptionTier, TierThresholds};
pub use domain::{MeterSummary, Reading, TariffClass};
