//! The agent socket wire protocol: a closed sum type over every JSON frame
//! that can cross an agent's WebSocket, per the Design Notes' requirement
//! that dynamic JSON be replaced by a closed enum. Frames are exchanged one
//! JSON object per WebSocket text message.

use rcd_core::{CommandId, CommandStatus};
use rcd_validator::Policy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    /// Coordinator → agent: dispatch a command.
    Command {
        command_id: CommandId,
        command: String,
        timeout: u32,
        #[serde(default)]
        priority: i32,
    },
    /// Agent → coordinator: the command finished running.
    Result {
        command_id: CommandId,
        #[serde(default)]
        stdout: String,
        #[serde(default)]
        stderr: String,
        exit_code: i32,
        execution_time: f64,
    },
    /// Agent → coordinator: the command could not run at all (local
    /// validation rejection or spawn failure).
    Error { command_id: CommandId, error: String },
    /// Either direction: keep-alive probe.
    Ping,
    /// Either direction: keep-alive reply.
    Pong,
    /// Coordinator → agent, sent once at session activation.
    Welcome { policy: Policy, ping_interval_seconds: u64 },
}

impl Frame {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Command { .. } => "command",
            Self::Result { .. } => "result",
            Self::Error { .. } => "error",
            Self::Ping => "ping",
            Self::Pong => "pong",
            Self::Welcome { .. } => "welcome",
        }
    }

    pub fn command_id(&self) -> Option<CommandId> {
        match self {
            Self::Command { command_id, .. }
            | Self::Result { command_id, .. }
            | Self::Error { command_id, .. } => Some(*command_id),
            Self::Ping | Self::Pong | Self::Welcome { .. } => None,
        }
    }
}

/// Outcome a [`Frame::Result`]/[`Frame::Error`]/timeout resolves a waiter
/// to. Distinct from [`CommandStatus`] because a waiter only ever resolves
/// to one of these three — `Pending`/`Sent`/`Executing` never reach a
/// waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed,
    TimedOut,
}

impl From<Outcome> for CommandStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Completed => CommandStatus::Completed,
            Outcome::Failed => CommandStatus::Failed,
            Outcome::TimedOut => CommandStatus::Timeout,
        }
    }
}

/// Encode a frame as a single-line JSON text message.
#[allow(clippy::expect_used)]
pub fn encode(frame: &Frame) -> String {
    serde_json::to_string(frame).expect("Frame serialization is infallible")
}

/// Decode a single JSON text message into a frame.
///
/// Per the Design Notes, an unrecognized `type` or malformed payload is
/// never fatal to the session — callers should log and drop on `Err`, not
/// tear down the connection.
pub fn decode(text: &str) -> Result<Frame, DecodeError> {
    serde_json::from_str(text).map_err(|source| DecodeError { source })
}

#[derive(Debug, thiserror::Error)]
#[error("malformed frame: {source}")]
pub struct DecodeError {
    #[source]
    source: serde_json::Error,
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
