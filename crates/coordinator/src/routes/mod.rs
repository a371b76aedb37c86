//! One handler module per REST resource, mirroring the teacher's
//! one-handler-per-concern `listener/` layout.

pub mod agents;
pub mod commands;
pub mod export;
pub mod health;
pub mod statistics;
pub mod ws;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::context::CoordinatorContext;

pub fn build_router(ctx: CoordinatorContext) -> Router {
    Router::new()
        .route("/", get(health::health))
        .route("/agents", get(agents::list_agents))
        .route("/agents/:agent_id", get(agents::get_agent))
        .route("/agents/:agent_id/commands", post(agents::submit_command).get(agents::agent_history))
        .route("/agents/:agent_id/queue", get(agents::agent_queue))
        .route("/commands", get(commands::list_commands))
        .route("/commands/:command_id", get(commands::get_command).delete(commands::cancel_command))
        .route("/commands/bulk", post(commands::bulk_submit))
        .route("/history/export", get(export::export))
        .route("/history/cleanup", post(statistics::cleanup))
        .route("/statistics", get(statistics::statistics))
        .route("/agent/socket", get(ws::agent_socket))
        .with_state(ctx)
}
