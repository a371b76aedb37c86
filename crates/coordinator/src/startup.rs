//! Coordinator startup recovery: the restart policy SPEC_FULL.md §9 resolves
//! Open Question 1 with. Any command still `sent`/`executing` in the store
//! when the process comes back up was mid-flight during an unclean
//! shutdown (a clean one drains sessions first, which already fails these
//! the same way via `rcd_engine`'s `unbind`) — transition it to `failed`
//! before any queue actor rebuilds its in-memory `pending` set.

use std::sync::Arc;

use rcd_core::{Clock, CommandStatus};
use rcd_storage::{Store, TransitionPatch};

pub async fn recover_in_flight(store: &Arc<dyn Store>, clock: &Arc<dyn Clock>) {
    let in_flight = match store.in_flight_commands().await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "failed to list in-flight commands at startup");
            return;
        }
    };

    for command in in_flight {
        let now_ms = clock.unix_ms();
        let result = store
            .transition(
                command.command_id,
                &[CommandStatus::Sent, CommandStatus::Executing],
                CommandStatus::Failed,
                TransitionPatch {
                    completed_at_ms: Some(now_ms),
                    error_message: Some("coordinator restart".to_string()),
                    ..Default::default()
                },
            )
            .await;
        match result {
            Ok(true) => tracing::info!(
                command_id = %command.command_id,
                agent_id = %command.agent_id,
                "failed in-flight command found at startup"
            ),
            Ok(false) => {}
            Err(e) => tracing::error!(command_id = %command.command_id, error = %e, "startup recovery transition failed"),
        }
    }
}
