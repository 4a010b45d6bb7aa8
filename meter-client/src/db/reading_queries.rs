use anyhow::Result;
use serde::Serialize;
use sqlx::MySqlPool;
use time::OffsetDateTime;

/// One row of the telemetry store's consumption table. Site descriptors are
/// joined in by the data-access layer, not here.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ConsumptionRow {
    pub meter_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub ts: OffsetDateTime,
    pub consumption: Option<f64>,
    pub reading_value: Option<f64>,
}

/// Fetch every consumption row in the window, oldest first.
pub async fn consumption_window(
    pool: &MySqlPool,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<Vec<ConsumptionRow>> {
    let rows = sqlx::query_as::<_, ConsumptionRow>(
        r#"
        SELECT
            meter_id,
            ts,
            consumption,
            reading_value
        FROM meter_readings
        WHERE ts >= ?
          AND ts <  ?
        ORDER BY ts
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Time-ordered history for a single meter. Backs the per-meter detail
/// charts; the window endpoints follow the same half-open convention as
/// `consumption_window`.
pub async fn meter_history(
    pool: &MySqlPool,
    meter_id: &str,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<Vec<ConsumptionRow>> {
    let rows = sqlx::query_as::<_, ConsumptionRow>(
        r#"
        SELECT
            meter_id,
            ts,
            consumption,
            reading_value
        FROM meter_readings
        WHERE meter_id = ?
          AND ts >= ?
          AND ts <  ?
        ORDER BY ts
        "#,
    )
    .bind(meter_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
