use axum::extract::{Path, Query, State};
use axum::Json;
use rcd_core::{AgentId, Command, CommandId};
use rcd_storage::ListFilter;
use rcd_wire::api::{BulkOutcome, BulkSubmitRequest, BulkSubmitResult, CommandFilter, CommandView};

use crate::context::CoordinatorContext;
use crate::error::ApiError;

/// `GET /commands` — filter/list.
pub async fn list_commands(
    State(ctx): State<CoordinatorContext>,
    Query(filter): Query<CommandFilter>,
) -> Result<Json<Vec<CommandView>>, ApiError> {
    let store_filter = ListFilter {
        agent_id: filter.agent_id,
        status: filter.status,
        created_after_ms: filter.created_after_ms,
        created_before_ms: filter.created_before_ms,
        limit: filter.limit,
        offset: filter.offset,
    };
    let rows = ctx.store.list_commands(store_filter).await?;
    Ok(Json(rows.into_iter().map(CommandView::from).collect()))
}

/// `GET /commands/{id}`
pub async fn get_command(
    State(ctx): State<CoordinatorContext>,
    Path(command_id): Path<String>,
) -> Result<Json<CommandView>, ApiError> {
    let id = CommandId::from_string(&command_id);
    let command = ctx.store.get_command(id).await?.ok_or(ApiError::CommandNotFound)?;
    Ok(Json(command.into()))
}

/// `DELETE /commands/{id}` — cancel if pending.
pub async fn cancel_command(
    State(ctx): State<CoordinatorContext>,
    Path(command_id): Path<String>,
) -> Result<(), ApiError> {
    let id = CommandId::from_string(&command_id);
    let command = ctx.store.get_command(id).await?.ok_or(ApiError::CommandNotFound)?;
    let queue = ctx.engine.queue_for(command.agent_id);
    queue.cancel(id).await?;
    Ok(())
}

/// `POST /commands/bulk` — fan-out submit to multiple agents, single command.
pub async fn bulk_submit(
    State(ctx): State<CoordinatorContext>,
    Json(req): Json<BulkSubmitRequest>,
) -> Json<Vec<BulkSubmitResult>> {
    let now_ms = ctx.clock.unix_ms();
    let mut results = Vec::with_capacity(req.agent_ids.len());
    for agent_id_str in req.agent_ids {
        let agent_id = AgentId::from_string(&agent_id_str);
        let command = Command::new_pending(
            agent_id,
            req.command.clone(),
            req.timeout.unwrap_or(ctx.policy.max_timeout_seconds),
            req.priority.unwrap_or(0),
            now_ms,
        );
        let queue = ctx.engine.queue_for(agent_id);
        let outcome = match queue.submit(command).await {
            Ok(accepted) => BulkOutcome::Submitted { command_id: accepted.command_id },
            Err(e) => {
                let api_err: ApiError = e.into();
                BulkOutcome::Rejected { reason: api_err.to_string() }
            }
        };
        results.push(BulkSubmitResult { agent_id, outcome });
    }
    Json(results)
}
