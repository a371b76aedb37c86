use axum::extract::State;
use axum::Json;
use rcd_wire::api::HealthSnapshot;

use crate::context::CoordinatorContext;

/// `GET /` — status/health snapshot (spec.md §6). Ambient: every
/// long-running service in the corpus exposes one.
pub async fn health(State(ctx): State<CoordinatorContext>) -> Json<HealthSnapshot> {
    let known_agents = ctx.store.list_agents().await.map(|a| a.len()).unwrap_or(0);
    let online_agents = ctx.sessions.online_agent_ids().len();

    let mut queued = 0;
    let mut in_flight = 0;
    for agent_id in ctx.sessions.online_agent_ids() {
        if let Some(summary) = ctx.engine.summary_for(&agent_id).await {
            queued += summary.pending;
            in_flight += summary.in_flight;
        }
    }

    Json(HealthSnapshot {
        uptime_seconds: ctx.start_time.elapsed().as_secs(),
        online_agents,
        known_agents,
        queued_commands: queued,
        in_flight_commands: in_flight,
        store_reachable: ctx.store.list_agents().await.is_ok(),
    })
}
