use rcd_core::{AgentId, CommandId};
use rcd_storage::StoreError;
use rcd_validator::Rejection;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("command rejected: {0}")]
    Rejected(#[from] Rejection),
    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),
    #[error("agent queue is full")]
    QueueFull,
    #[error("command {0} already exists")]
    CommandConflict(CommandId),
    #[error("command {0} not found")]
    CommandNotFound(CommandId),
    #[error("command {0} already dispatched, cannot cancel")]
    AlreadyDispatched(CommandId),
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
    #[error("queue engine is shutting down")]
    ShuttingDown,
}
