//! Command lifecycle: the single source of truth for what states a
//! dispatched command can be in and which transitions between them are legal.

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Globally unique, coordinator-assigned identifier for a dispatched command.
    pub struct CommandId("cmd-");
}

/// Lifecycle state of a command. Terminal states (`Completed`, `Failed`,
/// `Timeout`, `Cancelled`) are absorbing: no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Pending,
    Sent,
    Executing,
    Completed,
    Failed,
    Timeout,
    Cancelled,
}

crate::simple_display! {
    CommandStatus {
        Pending => "pending",
        Sent => "sent",
        Executing => "executing",
        Completed => "completed",
        Failed => "failed",
        Timeout => "timeout",
        Cancelled => "cancelled",
    }
}

impl CommandStatus {
    /// Terminal statuses never transition further.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Timeout | Self::Cancelled
        )
    }

    /// Whether `self -> next` is one of the edges drawn in the command
    /// lifecycle diagram. Used by the store's compare-and-set `transition`
    /// and mirrored by the in-memory queue so both sides agree on legality
    /// without either depending on the other.
    pub fn can_transition_to(self, next: Self) -> bool {
        use CommandStatus::*;
        matches!(
            (self, next),
            (Pending, Sent)
                | (Pending, Cancelled)
                | (Sent, Executing)
                | (Sent, Completed)
                | (Sent, Failed)
                | (Sent, Timeout)
                | (Executing, Completed)
                | (Executing, Failed)
                | (Executing, Timeout)
        )
    }
}

/// A single dispatched (or queued) command and its full lifecycle record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub command_id: CommandId,
    pub agent_id: AgentId,
    pub command: String,
    pub timeout_seconds: u32,
    pub priority: i32,
    pub status: CommandStatus,
    pub created_at_ms: i64,
    pub sent_at_ms: Option<i64>,
    pub completed_at_ms: Option<i64>,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub execution_time_seconds: Option<f64>,
    pub error_message: Option<String>,
    #[serde(default)]
    pub output_truncated: bool,
}

impl Command {
    /// Build a new `pending` command with all terminal fields unset.
    pub fn new_pending(
        agent_id: AgentId,
        command: String,
        timeout_seconds: u32,
        priority: i32,
        created_at_ms: i64,
    ) -> Self {
        Self {
            command_id: CommandId::new(),
            agent_id,
            command,
            timeout_seconds,
            priority,
            status: CommandStatus::Pending,
            created_at_ms,
            sent_at_ms: None,
            completed_at_ms: None,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            execution_time_seconds: None,
            error_message: None,
            output_truncated: false,
        }
    }

    /// Dispatch ordering key: higher priority first, then oldest first.
    /// `(-priority, created_at)` as spec'd, expressed so that the natural
    /// `Ord` on this tuple matches "dequeue smallest first".
    pub fn dispatch_key(&self) -> (i32, i64) {
        (-self.priority, self.created_at_ms)
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
