use async_trait::async_trait;
use rcd_core::CommandId;

/// How a bound session delivers a dispatched command to its agent. The
/// engine depends only on this trait, never on `rcd-session` directly, so
/// the two crates communicate as independently-owned actors rather than
/// sharing an object graph.
#[async_trait]
pub trait SessionSink: Send + Sync + 'static {
    async fn send_command(
        &self,
        command_id: CommandId,
        command: &str,
        timeout_seconds: u32,
        priority: i32,
    ) -> Result<(), SendError>;
}

#[derive(Debug, thiserror::Error)]
#[error("session send failed: {0}")]
pub struct SendError(pub String);

/// What a dispatched command resolved to, as reported back by whichever side
/// observed the outcome: a session's `result`/`error` frame, or the
/// deadline wheel.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    Completed {
        stdout: String,
        stderr: String,
        exit_code: i32,
        execution_time_seconds: f64,
        output_truncated: bool,
    },
    Failed { error_message: String },
    TimedOut,
}
