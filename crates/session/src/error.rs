#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unknown or revoked token")]
    UnknownToken,
}
