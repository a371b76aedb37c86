use crate::sink::DispatchOutcome;
use rcd_core::CommandId;

/// A single dispatched command's in-flight bookkeeping: the generation lets
/// the queue actor tell a deadline fired for this exact dispatch apart from
/// a stale one left over from an earlier generation of the same
/// `command_id` slot (defensive; this protocol never reuses the id, but a
/// cancelled-then-redispatched waiter would otherwise be ambiguous).
pub struct InFlight {
    pub command_id: CommandId,
    pub generation: u64,
    pub deadline_ms: i64,
}

/// What the dispatch loop does in response to resolving an in-flight
/// command, expressed without reference to the Store or Session so it is
/// trivially testable.
pub fn terminal_patch_for(outcome: &DispatchOutcome, now_ms: i64) -> rcd_storage::TransitionPatch {
    match outcome {
        DispatchOutcome::Completed {
            stdout,
            stderr,
            exit_code,
            execution_time_seconds,
            output_truncated,
        } => rcd_storage::TransitionPatch {
            completed_at_ms: Some(now_ms),
            stdout: Some(stdout.clone()),
            stderr: Some(stderr.clone()),
            exit_code: Some(*exit_code),
            execution_time_seconds: Some(*execution_time_seconds),
            output_truncated: Some(*output_truncated),
            error_message: negative_exit_error(*exit_code),
            ..Default::default()
        },
        DispatchOutcome::Failed { error_message } => rcd_storage::TransitionPatch {
            completed_at_ms: Some(now_ms),
            error_message: Some(error_message.clone()),
            ..Default::default()
        },
        DispatchOutcome::TimedOut => rcd_storage::TransitionPatch {
            completed_at_ms: Some(now_ms),
            error_message: Some("deadline exceeded".to_string()),
            ..Default::default()
        },
    }
}

/// The lifecycle only allows `sent -> completed` for a `result` frame with
/// `exit_code >= 0`; a negative exit code is the agent's own signal that the
/// command never really ran to completion (see
/// `rcd_agent::executor::DEADLINE_EXIT_CODE`), so it lands in `failed`.
pub fn terminal_status_for(outcome: &DispatchOutcome) -> rcd_core::CommandStatus {
    match outcome {
        DispatchOutcome::Completed { exit_code, .. } if *exit_code < 0 => rcd_core::CommandStatus::Failed,
        DispatchOutcome::Completed { .. } => rcd_core::CommandStatus::Completed,
        DispatchOutcome::Failed { .. } => rcd_core::CommandStatus::Failed,
        DispatchOutcome::TimedOut => rcd_core::CommandStatus::Timeout,
    }
}

fn negative_exit_error(exit_code: i32) -> Option<String> {
    (exit_code < 0).then(|| format!("agent reported negative exit code {exit_code}"))
}
