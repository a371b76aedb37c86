use axum::extract::{Query, State};
use axum::Json;
use rcd_storage::StatsFilter;
use rcd_wire::api::{CleanupRequest, CleanupResponse, StatisticsResponse};
use serde::Deserialize;

use crate::context::CoordinatorContext;
use crate::error::ApiError;

#[derive(Debug, Deserialize, Default)]
pub struct StatisticsQuery {
    pub agent_id: Option<String>,
    pub created_after_ms: Option<i64>,
    pub created_before_ms: Option<i64>,
}

/// `GET /statistics` — counts grouped by status, plus average execution
/// time over `completed`, plus the ambient `late_result_drops` counter
/// spec.md §8 scenario S4 requires.
pub async fn statistics(
    State(ctx): State<CoordinatorContext>,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<StatisticsResponse>, ApiError> {
    let stats = ctx
        .store
        .statistics(StatsFilter {
            agent_id: query.agent_id,
            created_after_ms: query.created_after_ms,
            created_before_ms: query.created_before_ms,
        })
        .await?;

    let counts_by_status =
        stats.counts_by_status.into_iter().map(|(status, count)| (status.to_string(), count)).collect();

    Ok(Json(StatisticsResponse {
        counts_by_status,
        average_execution_time_seconds: stats.average_execution_time_seconds,
        late_result_drops: ctx.engine.metrics().late_result_drops,
    }))
}

/// `POST /history/cleanup` — purge terminal commands older than N days.
pub async fn cleanup(
    State(ctx): State<CoordinatorContext>,
    Json(req): Json<CleanupRequest>,
) -> Result<Json<CleanupResponse>, ApiError> {
    let cutoff_ms = ctx.clock.unix_ms() - i64::from(req.older_than_days) * 86_400_000;
    let deleted = ctx.store.purge_older_than(cutoff_ms).await?;
    Ok(Json(CleanupResponse { deleted }))
}
