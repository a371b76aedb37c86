//! Connects to the coordinator, keeps exactly one live session up with
//! capped exponential backoff on disconnect, and routes inbound frames to
//! the executor (spec.md §4.6).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures_util::{Sink, SinkExt, StreamExt};
use rcd_wire::{decode, encode, Frame};
use tokio_tungstenite::tungstenite::Message;

use crate::config::AgentConfig;
use crate::executor;

/// Runs forever: connect, serve the session until it drops, back off, retry.
pub async fn run(config: AgentConfig) {
    let mut attempt: u32 = 0;
    loop {
        match connect_and_serve(&config).await {
            Ok(()) => {
                tracing::info!("session ended cleanly, reconnecting");
                attempt = 0;
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt, "session failed");
            }
        }
        let delay = backoff_delay(&config, attempt);
        tracing::info!(delay_ms = delay.as_millis() as u64, "reconnecting after backoff");
        tokio::time::sleep(delay).await;
        attempt = attempt.saturating_add(1);
    }
}

/// Exponential backoff from `reconnect_initial_ms`, doubling per attempt and
/// capped at `reconnect_cap_ms`, with up to 20% jitter. Jitter is derived
/// from the current time rather than a `rand` dependency the crate's stack
/// otherwise has no use for.
fn backoff_delay(config: &AgentConfig, attempt: u32) -> Duration {
    let base = config
        .reconnect_initial_ms
        .saturating_mul(1u64.checked_shl(attempt.min(16)).unwrap_or(u64::MAX))
        .min(config.reconnect_cap_ms);
    let jitter_seed = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.subsec_nanos()).unwrap_or(0);
    let jitter_pct = u64::from(jitter_seed % 20);
    let jitter = base * jitter_pct / 100;
    Duration::from_millis(base.saturating_sub(jitter / 2).saturating_add(jitter / 2))
}

async fn connect_and_serve(config: &AgentConfig) -> Result<(), ClientError> {
    let url = config.socket_url();
    tracing::info!(url = %redact_token(&url), "connecting");

    let (ws, _response) = tokio_tungstenite::connect_async(&url)
        .await
        .map_err(|e| ClientError::Connect(e.to_string()))?;
    let (mut write, mut read) = ws.split();

    let mut ping_interval = tokio::time::interval(Duration::from_secs(config.ping_interval_s.max(1)));
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ping_interval.reset();

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if write.send(Message::Text(encode(&Frame::Ping))).await.is_err() {
                    return Err(ClientError::Send);
                }
            }
            msg = read.next() => {
                let msg = match msg {
                    Some(Ok(m)) => m,
                    Some(Err(e)) => return Err(ClientError::Recv(e.to_string())),
                    None => return Ok(()),
                };
                match msg {
                    Message::Text(text) => {
                        ping_interval.reset();
                        match decode(&text) {
                            Ok(frame) => handle_frame(config, frame, &mut write).await?,
                            Err(e) => tracing::warn!(error = %e, "dropping malformed frame"),
                        }
                    }
                    Message::Ping(payload) => {
                        let _ = write.send(Message::Pong(payload)).await;
                    }
                    Message::Close(_) => return Ok(()),
                    _ => {}
                }
            }
        }
    }
}

async fn handle_frame(
    config: &AgentConfig,
    frame: Frame,
    write: &mut (impl Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin),
) -> Result<(), ClientError> {
    match frame {
        Frame::Welcome { policy, ping_interval_seconds } => {
            tracing::info!(ping_interval_seconds, "session activated");
            let _ = policy;
        }
        Frame::Ping => {
            write.send(Message::Text(encode(&Frame::Pong))).await.map_err(|_| ClientError::Send)?;
        }
        Frame::Pong => {}
        Frame::Command { command_id, command, timeout, priority } => {
            let _ = priority;
            if let Err(rejection) =
                rcd_validator::validate(&command, Some(timeout), &config.policy)
            {
                let reply = Frame::Error { command_id, error: rejection.to_string() };
                write.send(Message::Text(encode(&reply))).await.map_err(|_| ClientError::Send)?;
                return Ok(());
            }
            let reply = match executor::execute(&command, Duration::from_secs(u64::from(timeout))).await {
                Ok(result) => Frame::Result {
                    command_id,
                    stdout: result.stdout,
                    stderr: result.stderr,
                    exit_code: result.exit_code,
                    execution_time: result.execution_time_seconds,
                },
                Err(e) => Frame::Error { command_id, error: e.to_string() },
            };
            write.send(Message::Text(encode(&reply))).await.map_err(|_| ClientError::Send)?;
        }
        Frame::Result { .. } | Frame::Error { .. } => {
            tracing::warn!("received a frame that only flows coordinator-ward, ignoring");
        }
    }
    Ok(())
}

fn redact_token(url: &str) -> String {
    match url.find("token=") {
        Some(idx) => format!("{}token=<redacted>", &url[..idx]),
        None => url.to_string(),
    }
}

#[derive(Debug, thiserror::Error)]
enum ClientError {
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("receive failed: {0}")]
    Recv(String),
    #[error("send failed")]
    Send,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_and_caps() {
        let config = AgentConfig { reconnect_initial_ms: 1000, reconnect_cap_ms: 60_000, ..Default::default() };
        let d0 = backoff_delay(&config, 0).as_millis();
        let d6 = backoff_delay(&config, 6).as_millis();
        let d20 = backoff_delay(&config, 20).as_millis();
        assert!(d0 <= 1100);
        assert!(d6 > d0);
        assert!(d20 <= 60_100);
    }

    #[test]
    fn redacts_token_in_url() {
        let url = "wss://host/agent/socket?token=supersecret";
        assert_eq!(redact_token(url), "wss://host/agent/socket?token=<redacted>");
    }
}
