use anyhow::{bail, Context, Result};
use dashboard_service::{
    config::{AppConfig, SiteSourceKind},
    observability,
    snapshot::build_snapshot,
    store::{CsvSiteCatalog, QueryWindow, SiteCatalog, SqlReadingStore},
};
use meter_client::classify::TierThresholds;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::postgres::PgPoolOptions;
use std::env;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// One-shot snapshot for a window, printed as JSON. Useful for wiring up a
/// rendering layer without running the HTTP service.
#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        bail!("usage: print_snapshot <start_rfc3339> <end_rfc3339> [district]");
    }
    let start = OffsetDateTime::parse(&args[1], &Rfc3339).context("invalid start")?;
    let end = OffsetDateTime::parse(&args[2], &Rfc3339).context("invalid end")?;
    let district = args.get(3).cloned();

    // Load configuration (can point DASHBOARD_CONFIG to an alternate file).
    let cfg = AppConfig::load()?;
    let thresholds = TierThresholds::from_overrides(&cfg.thresholds)?;

    let telemetry = MySqlPoolOptions::new()
        .max_connections(cfg.telemetry_db.max_connections)
        .connect(&cfg.telemetry_db.uri)
        .await?;

    let sites = match cfg.site_catalog.kind {
        SiteSourceKind::Gis => {
            let gis = cfg
                .gis_db
                .as_ref()
                .context("site_catalog.kind is 'gis' but [gis_db] is not configured")?;
            let pool = PgPoolOptions::new()
                .max_connections(gis.max_connections)
                .connect(&gis.uri)
                .await?;
            SiteCatalog::Gis(pool)
        }
        SiteSourceKind::Csv => {
            let Some(path) = &cfg.site_catalog.csv_path else {
                bail!("site_catalog.kind is 'csv' but csv_path is not set");
            };
            SiteCatalog::Csv(CsvSiteCatalog::load_from_path(path)?)
        }
    };

    // No cache layer: a one-shot run recomputes by definition.
    let store = SqlReadingStore::new(telemetry, sites);
    let window = QueryWindow { start, end, district };

    let snap = build_snapshot(&store, &thresholds, cfg.static_fields, &window, 10).await?;
    println!("{}", serde_json::to_string_pretty(&snap)?);

    Ok(())
}
