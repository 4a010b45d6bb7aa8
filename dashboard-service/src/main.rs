use anyhow::{bail, Context, Result};
use dashboard_service::{
    config::{AppConfig, SiteSourceKind},
    http::{self, AppState},
    metrics_server, observability,
    store::{CachedReadingStore, CsvSiteCatalog, SiteCatalog, SqlReadingStore},
};
use meter_client::classify::TierThresholds;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let thresholds = TierThresholds::from_overrides(&cfg.thresholds)?;

    let telemetry = MySqlPoolOptions::new()
        .max_connections(cfg.telemetry_db.max_connections)
        .connect(&cfg.telemetry_db.uri)
        .await
        .context("failed to connect to the telemetry store")?;

    let sites = match cfg.site_catalog.kind {
        SiteSourceKind::Gis => {
            let gis = cfg
                .gis_db
                .as_ref()
                .context("site_catalog.kind is 'gis' but [gis_db] is not configured")?;
            let pool = PgPoolOptions::new()
                .max_connections(gis.max_connections)
                .connect(&gis.uri)
                .await
                .context("failed to connect to the geospatial store")?;
            SiteCatalog::Gis(pool)
        }
        SiteSourceKind::Csv => {
            let Some(path) = &cfg.site_catalog.csv_path else {
                bail!("site_catalog.kind is 'csv' but csv_path is not set");
            };
            let catalog = CsvSiteCatalog::load_from_path(path)?;
            tracing::info!(sites = catalog.rows().len(), path = %path, "loaded site catalog from CSV");
            SiteCatalog::Csv(catalog)
        }
    };

    let store = SqlReadingStore::new(telemetry, sites);
    let cached = Arc::new(CachedReadingStore::new(
        store,
        Duration::from_secs(cfg.cache.ttl_seconds),
        cfg.cache.max_entries,
    ));

    let state = AppState {
        store: cached,
        thresholds: Arc::new(thresholds),
        reducer: cfg.static_fields,
    };

    let app = http::router(state);
    let listener = tokio::net::TcpListener::bind(&cfg.http.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.http.bind_addr))?;
    tracing::info!(addr = %cfg.http.bind_addr, "dashboard service listening");
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
