pub mod reading_queries;
pub mod site_queries;

pub use reading_queries::ConsumptionRow;
pub use site_queries::SiteRow;
