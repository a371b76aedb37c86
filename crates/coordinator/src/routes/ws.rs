use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::Response;
use rcd_session::SessionConfig;
use serde::Deserialize;

use crate::context::CoordinatorContext;

#[derive(Debug, Deserialize)]
pub struct SocketQuery {
    pub token: String,
}

/// `GET /agent/socket?token=...` — the agent socket entry point (spec.md
/// §4.3, §6): the handshake's only supported form is a bearer token on the
/// query string.
pub async fn agent_socket(
    State(ctx): State<CoordinatorContext>,
    Query(query): Query<SocketQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let config = SessionConfig {
        ping_interval_seconds: ctx.config.ping_interval_seconds,
        max_output_bytes: ctx.config.max_output_bytes,
    };
    ws.on_upgrade(move |socket| async move {
        rcd_session::accept(
            socket,
            &query.token,
            &ctx.auth,
            ctx.policy.clone(),
            ctx.store.clone(),
            ctx.engine.clone(),
            ctx.sessions.clone(),
            config,
        )
        .await;
    })
}
