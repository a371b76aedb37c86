use axum::extract::{Path, Query, State};
use axum::Json;
use rcd_core::{Agent, AgentId, AgentStatus, Command};
use rcd_storage::ListFilter;
use rcd_wire::api::{AgentView, CommandFilter, CommandView, QueueSummary, SubmitRequest, SubmitResponse};

use crate::context::CoordinatorContext;
use crate::error::ApiError;

fn view(ctx: &CoordinatorContext, agent: Agent, pending: usize, in_flight: usize) -> AgentView {
    let online = ctx.sessions.is_online(&agent.agent_id);
    AgentView {
        agent_id: agent.agent_id,
        status: if online { AgentStatus::Online } else { AgentStatus::Offline },
        first_seen_ms: agent.first_seen_ms,
        last_connected_ms: agent.last_connected_ms,
        metadata: agent.metadata,
        pending_count: pending,
        in_flight_count: in_flight,
    }
}

/// `GET /agents` — union of store agents with live-session overlay.
pub async fn list_agents(
    State(ctx): State<CoordinatorContext>,
) -> Result<Json<Vec<AgentView>>, ApiError> {
    let agents = ctx.store.list_agents().await?;
    let mut out = Vec::with_capacity(agents.len());
    for agent in agents {
        let summary = ctx.engine.summary_for(&agent.agent_id).await;
        let (pending, in_flight) = summary.map(|s| (s.pending, s.in_flight)).unwrap_or((0, 0));
        out.push(view(&ctx, agent, pending, in_flight));
    }
    Ok(Json(out))
}

/// `GET /agents/{id}`
pub async fn get_agent(
    State(ctx): State<CoordinatorContext>,
    Path(agent_id): Path<String>,
) -> Result<Json<AgentView>, ApiError> {
    let id = AgentId::from_string(&agent_id);
    let agent = ctx.store.get_agent(&id).await?.ok_or_else(|| ApiError::UnknownAgent(agent_id))?;
    let summary = ctx.engine.summary_for(&id).await;
    let (pending, in_flight) = summary.map(|s| (s.pending, s.in_flight)).unwrap_or((0, 0));
    Ok(Json(view(&ctx, agent, pending, in_flight)))
}

/// `POST /agents/{id}/commands` — submit (spec.md §4.5).
pub async fn submit_command(
    State(ctx): State<CoordinatorContext>,
    Path(agent_id): Path<String>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let agent_id = AgentId::from_string(&agent_id);
    let now_ms = ctx.clock.unix_ms();
    let command = Command::new_pending(
        agent_id,
        req.command,
        req.timeout.unwrap_or(ctx.policy.max_timeout_seconds),
        req.priority.unwrap_or(0),
        now_ms,
    );
    let queue = ctx.engine.queue_for(agent_id);
    let accepted = queue.submit(command).await?;
    Ok(Json(SubmitResponse {
        command_id: accepted.command_id,
        status: accepted.status,
        effective_timeout_seconds: accepted.timeout_seconds,
        effective_priority: accepted.priority,
    }))
}

/// `GET /agents/{id}/commands` — agent history (paginated).
pub async fn agent_history(
    State(ctx): State<CoordinatorContext>,
    Path(agent_id): Path<String>,
    Query(filter): Query<CommandFilter>,
) -> Result<Json<Vec<CommandView>>, ApiError> {
    let store_filter = ListFilter {
        agent_id: Some(agent_id),
        status: filter.status,
        created_after_ms: filter.created_after_ms,
        created_before_ms: filter.created_before_ms,
        limit: filter.limit,
        offset: filter.offset,
    };
    let rows = ctx.store.list_commands(store_filter).await?;
    Ok(Json(rows.into_iter().map(CommandView::from).collect()))
}

/// `GET /agents/{id}/queue` — current queue summary.
pub async fn agent_queue(
    State(ctx): State<CoordinatorContext>,
    Path(agent_id): Path<String>,
) -> Result<Json<QueueSummary>, ApiError> {
    let id = AgentId::from_string(&agent_id);
    let online = ctx.sessions.is_online(&id);
    let pending = ctx
        .store
        .pending_for_agent(&id)
        .await?
        .into_iter()
        .map(CommandView::from)
        .collect();
    let in_flight = ctx
        .store
        .in_flight_commands()
        .await?
        .into_iter()
        .filter(|c| c.agent_id == id)
        .map(CommandView::from)
        .collect();
    Ok(Json(QueueSummary { agent_id: id, online, pending, in_flight }))
}
