use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use meter_client::aggregate::StaticFieldReducer;
use meter_client::classify::TierThresholds;
use meter_client::db::ConsumptionRow;
use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::snapshot::{self, Snapshot};
use crate::store::{CachedReadingStore, QueryWindow, ReadingStore, SqlReadingStore};

const DEFAULT_TOP: usize = 10;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CachedReadingStore<SqlReadingStore>>,
    pub thresholds: Arc<TierThresholds>,
    pub reducer: StaticFieldReducer,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/snapshot", get(get_snapshot))
        .route("/meters/:meter_id/history", get(get_meter_history))
        .route("/cache/invalidate", post(invalidate_cache))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
pub struct WindowParams {
    /// RFC3339, inclusive.
    pub start: String,
    /// RFC3339, exclusive.
    pub end: String,
    pub district: Option<String>,
    pub top: Option<usize>,
}

fn parse_window(params: &WindowParams) -> Result<QueryWindow, String> {
    let start = OffsetDateTime::parse(&params.start, &Rfc3339)
        .map_err(|e| format!("invalid start '{}': {e}", params.start))?;
    let end = OffsetDateTime::parse(&params.end, &Rfc3339)
        .map_err(|e| format!("invalid end '{}': {e}", params.end))?;
    if end <= start {
        return Err("end must be after start".to_string());
    }
    Ok(QueryWindow {
        start,
        end,
        district: params.district.clone().filter(|d| !d.trim().is_empty()),
    })
}

async fn get_snapshot(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> Result<Json<Snapshot>, (StatusCode, String)> {
    metrics::counter!("http_snapshot_requests_total").increment(1);

    let window = parse_window(&params).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    let top = params.top.unwrap_or(DEFAULT_TOP);

    match snapshot::build_snapshot(
        state.store.as_ref(),
        &state.thresholds,
        state.reducer,
        &window,
        top,
    )
    .await
    {
        Ok(snap) => Ok(Json(snap)),
        Err(e) => {
            tracing::error!(error = %e, "snapshot build failed");
            metrics::counter!("http_snapshot_failed_total").increment(1);
            Err((StatusCode::BAD_GATEWAY, e.to_string()))
        }
    }
}

async fn get_meter_history(
    State(state): State<AppState>,
    Path(meter_id): Path<String>,
    Query(params): Query<WindowParams>,
) -> Result<Json<Vec<ConsumptionRow>>, (StatusCode, String)> {
    let window = parse_window(&params).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    match state.store.meter_history(&meter_id, &window).await {
        Ok(rows) => Ok(Json(rows)),
        Err(e) => {
            tracing::error!(error = %e, meter_id, "meter history fetch failed");
            Err((StatusCode::BAD_GATEWAY, e.to_string()))
        }
    }
}

/// Explicit cache invalidation, for use after the periodic sync job
/// rewrites the stores.
async fn invalidate_cache(State(state): State<AppState>) -> StatusCode {
    state.store.invalidate_all();
    tracing::info!("reading cache invalidated");
    StatusCode::NO_CONTENT
}
