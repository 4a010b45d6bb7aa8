use meter_client::aggregate::{aggregate, top_consumers, StaticFieldReducer};
use meter_client::classify::{ConsumptionTier, TierThresholds};
use meter_client::domain::MeterSummary;
use serde::Serialize;
use time::OffsetDateTime;

use crate::store::{QueryWindow, ReadingStore, StoreError};

/// One classified meter, ready for tables and widgets.
#[derive(Debug, Clone, Serialize)]
pub struct MeterStatus {
    pub summary: MeterSummary,
    pub tier: ConsumptionTier,
    pub color: &'static str,
}

/// One plottable marker. Only meters with usable coordinates appear here;
/// the full set stays in `Snapshot::meters`.
#[derive(Debug, Clone, Serialize)]
pub struct MapMarker {
    pub meter_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub tier: ConsumptionTier,
    pub color: &'static str,
    pub consumption_total: f64,
    pub name: Option<String>,
    pub district: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotTotals {
    pub meter_count: usize,
    pub reading_count: usize,
    pub consumption_total: f64,
}

/// Everything the rendering layer needs for one query window.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    #[serde(with = "time::serde::rfc3339")]
    pub window_start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub window_end: OffsetDateTime,
    pub district: Option<String>,
    pub totals: SnapshotTotals,
    pub meters: Vec<MeterStatus>,
    pub map_markers: Vec<MapMarker>,
    pub top_consumers: Vec<MeterStatus>,
}

fn status_for(thresholds: &TierThresholds, summary: MeterSummary) -> MeterStatus {
    let tier = thresholds.classify(summary.tariff_class.as_deref(), Some(summary.consumption_total));
    MeterStatus {
        color: tier.color_hex(),
        tier,
        summary,
    }
}

fn marker_for(status: &MeterStatus) -> Option<MapMarker> {
    let (latitude, longitude) = status.summary.map_position()?;
    Some(MapMarker {
        meter_id: status.summary.meter_id.clone(),
        latitude,
        longitude,
        tier: status.tier,
        color: status.color,
        consumption_total: status.summary.consumption_total,
        name: status.summary.name.clone(),
        district: status.summary.district.clone(),
    })
}

/// Recompute the dashboard state for one window from scratch: fetch,
/// aggregate, classify. Stateless across invocations; repeat windows are
/// absorbed by the caching store layer, not here.
pub async fn build_snapshot<S>(
    store: &S,
    thresholds: &TierThresholds,
    reducer: StaticFieldReducer,
    window: &QueryWindow,
    top: usize,
) -> Result<Snapshot, StoreError>
where
    S: ReadingStore + ?Sized,
{
    let rows = store.fetch_window(window).await?;
    let reading_count = rows.len();

    let summaries = aggregate(&rows, reducer);
    let ranking = top_consumers(&summaries, top);

    let meters: Vec<MeterStatus> = summaries
        .into_iter()
        .map(|s| status_for(thresholds, s))
        .collect();
    let top_ranked: Vec<MeterStatus> = ranking
        .into_iter()
        .map(|s| status_for(thresholds, s))
        .collect();

    let map_markers: Vec<MapMarker> = meters.iter().filter_map(marker_for).collect();
    let consumption_total: f64 = meters.iter().map(|m| m.summary.consumption_total).sum();

    tracing::info!(
        meters = meters.len(),
        readings = reading_count,
        markers = map_markers.len(),
        "built snapshot"
    );
    metrics::counter!("snapshots_built_total").increment(1);

    Ok(Snapshot {
        window_start: window.start,
        window_end: window.end,
        district: window.district.clone(),
        totals: SnapshotTotals {
            meter_count: meters.len(),
            reading_count,
            consumption_total,
        },
        meters,
        map_markers,
        top_consumers: top_ranked,
    })
}
