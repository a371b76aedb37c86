use rcd_core::AgentId;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),
    #[error("command id already exists")]
    CommandConflict,
    #[error("command not found")]
    CommandNotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
