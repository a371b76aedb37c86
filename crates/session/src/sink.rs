//! Bridges the engine's [`SessionSink`] seam onto a live WebSocket's
//! outbound channel, so the queue actor can dispatch a command without
//! knowing anything about axum or the wire frame format.

use async_trait::async_trait;
use axum::extract::ws::Message;
use rcd_core::CommandId;
use rcd_engine::{SendError, SessionSink};
use rcd_wire::Frame;
use tokio::sync::mpsc;

pub struct WsSink {
    outbound: mpsc::UnboundedSender<Message>,
}

impl WsSink {
    pub fn new(outbound: mpsc::UnboundedSender<Message>) -> Self {
        Self { outbound }
    }
}

#[async_trait]
impl SessionSink for WsSink {
    async fn send_command(
        &self,
        command_id: CommandId,
        command: &str,
        timeout_seconds: u32,
        priority: i32,
    ) -> Result<(), SendError> {
        let frame = Frame::Command {
            command_id,
            command: command.to_string(),
            timeout: timeout_seconds,
            priority,
        };
        self.outbound
            .send(Message::Text(rcd_wire::encode(&frame).into()))
            .map_err(|_| SendError("socket closed".to_string()))
    }
}
