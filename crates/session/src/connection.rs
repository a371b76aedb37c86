//! The per-connection actor: owns one live WebSocket for the lifetime of
//! one agent's session, per the Design Notes' "three independently-owned
//! actors communicating by typed messages" requirement (session, queue,
//! coordinator all reach each other only through channels/trait objects).

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use rcd_core::{AgentId, AgentStatus};
use rcd_engine::{DispatchOutcome, QueueEngine};
use rcd_storage::Store;
use rcd_validator::Policy;
use rcd_wire::Frame;
use tokio::sync::mpsc;

use crate::auth::TokenIndex;
use crate::registry::SessionRegistry;
use crate::sink::WsSink;
use crate::state::CloseReason;

#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub ping_interval_seconds: u64,
    pub max_output_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { ping_interval_seconds: 30, max_output_bytes: 1024 * 1024 }
    }
}

/// Entry point for a freshly upgraded WebSocket: the AUTH_PENDING stage of
/// the session state machine. An unknown token closes the socket with the
/// policy-violation code before any payload is read; a known one hands off
/// to [`run`] for the ACTIVE stage.
pub async fn accept(
    mut socket: WebSocket,
    token: &str,
    auth: &TokenIndex,
    policy: Arc<Policy>,
    store: Arc<dyn Store>,
    engine: Arc<QueueEngine>,
    registry: SessionRegistry,
    config: SessionConfig,
) {
    let agent_id = match auth.authenticate(token) {
        Ok(agent_id) => agent_id,
        Err(_) => {
            tracing::warn!(token_hash = %auth.hash_prefix(token), "rejecting session with unknown token");
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: CloseReason::AuthFailed.code(),
                    reason: CloseReason::AuthFailed.as_str().into(),
                })))
                .await;
            return;
        }
    };
    run(socket, agent_id, policy, store, engine, registry, config).await;
}

/// Drives one agent's ACTIVE session end to end: keep-alive, frame
/// routing, and teardown. Runs until the socket closes for any reason.
async fn run(
    socket: WebSocket,
    agent_id: AgentId,
    policy: Arc<Policy>,
    store: Arc<dyn Store>,
    engine: Arc<QueueEngine>,
    registry: SessionRegistry,
    config: SessionConfig,
) {
    if let Err(e) = store.upsert_agent(&agent_id, BTreeMap::new()).await {
        tracing::warn!(%agent_id, error = %e, "failed to upsert agent record on connect");
    }
    if let Err(e) = store.mark_agent(&agent_id, AgentStatus::Online).await {
        tracing::warn!(%agent_id, error = %e, "failed to mark agent online");
    }

    let (mut ws_sink, mut ws_stream) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
    let (close_tx, mut close_rx) = mpsc::unbounded_channel::<CloseReason>();
    registry.register(agent_id, close_tx.clone());

    let send_task = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if ws_sink.send(msg).await.is_err() {
                break;
            }
        }
    });

    let welcome = Frame::Welcome {
        policy: (*policy).clone(),
        ping_interval_seconds: config.ping_interval_seconds,
    };
    let _ = outbound_tx.send(Message::Text(rcd_wire::encode(&welcome).into()));

    let queue = engine.queue_for(agent_id);
    queue.bind(Arc::new(WsSink::new(outbound_tx.clone()))).await;

    let ping_interval = Duration::from_secs(config.ping_interval_seconds);
    let liveness_timeout = ping_interval * 2;
    let mut ping_ticker = tokio::time::interval(ping_interval);
    ping_ticker.tick().await; // first tick fires immediately; consume it.
    let mut since_activity = tokio::time::interval(liveness_timeout);
    since_activity.tick().await;

    let reason = loop {
        tokio::select! {
            reason = close_rx.recv() => {
                break reason.unwrap_or(CloseReason::Graceful);
            }
            _ = ping_ticker.tick() => {
                let _ = outbound_tx.send(Message::Text(rcd_wire::encode(&Frame::Ping).into()));
            }
            _ = since_activity.tick() => {
                tracing::warn!(%agent_id, "no frame or pong within liveness window");
                break CloseReason::LivenessLost;
            }
            msg = ws_stream.next() => {
                since_activity.reset();
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_frame(&text, agent_id, &queue, &outbound_tx, config).await;
                    }
                    Some(Ok(Message::Close(_))) => break CloseReason::Graceful,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(%agent_id, error = %e, "session read error");
                        break CloseReason::Graceful;
                    }
                    None => break CloseReason::Graceful,
                }
            }
        }
    };

    let close_frame = Message::Close(Some(CloseFrame {
        code: reason.code(),
        reason: reason.as_str().into(),
    }));
    let _ = outbound_tx.send(close_frame);
    drop(outbound_tx);
    let _ = send_task.await;

    queue.unbind().await;
    if let Err(e) = store.mark_agent(&agent_id, AgentStatus::Offline).await {
        tracing::warn!(%agent_id, error = %e, "failed to mark agent offline");
    }
    registry.unregister(agent_id, &close_tx);
    tracing::info!(%agent_id, reason = reason.as_str(), "session closed");
}

async fn handle_frame(
    text: &str,
    agent_id: AgentId,
    queue: &rcd_engine::AgentQueueHandle,
    outbound_tx: &mpsc::UnboundedSender<Message>,
    config: SessionConfig,
) {
    let frame = match rcd_wire::decode(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(%agent_id, error = %e, "dropping malformed frame");
            return;
        }
    };

    match frame {
        Frame::Result { command_id, stdout, stderr, exit_code, execution_time } => {
            let (stdout, stdout_truncated) = truncate(stdout, config.max_output_bytes);
            let (stderr, stderr_truncated) = truncate(stderr, config.max_output_bytes);
            queue
                .resolve(
                    command_id,
                    DispatchOutcome::Completed {
                        stdout,
                        stderr,
                        exit_code,
                        execution_time_seconds: execution_time,
                        output_truncated: stdout_truncated || stderr_truncated,
                    },
                )
                .await;
        }
        Frame::Error { command_id, error } => {
            queue.resolve(command_id, DispatchOutcome::Failed { error_message: error }).await;
        }
        Frame::Ping => {
            let _ = outbound_tx.send(Message::Text(rcd_wire::encode(&Frame::Pong).into()));
        }
        Frame::Pong => {}
        Frame::Command { .. } | Frame::Welcome { .. } => {
            tracing::warn!(%agent_id, frame = frame.type_name(), "unexpected coordinator-bound frame");
        }
    }
}

fn truncate(s: String, max_bytes: usize) -> (String, bool) {
    if s.len() <= max_bytes {
        return (s, false);
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    (s[..end].to_string(), true)
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
