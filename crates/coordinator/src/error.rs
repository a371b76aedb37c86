//! Composes every crate's error enum into one `ApiError` with the HTTP
//! status mapping spec.md §7 and SPEC_FULL.md §7 specify.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rcd_engine::EngineError;
use rcd_storage::StoreError;
use rcd_validator::Rejection;
use rcd_wire::api::ErrorBody;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Rejected(#[from] Rejection),
    #[error("unknown agent {0}")]
    UnknownAgent(String),
    #[error("command not found")]
    CommandNotFound,
    #[error("agent queue is full")]
    QueueFull,
    #[error("command id already exists")]
    CommandConflict,
    #[error("command already dispatched, cannot cancel")]
    AlreadyDispatched,
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("coordinator is shutting down")]
    ShuttingDown,
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Rejected(r) => Self::Rejected(r),
            EngineError::UnknownAgent(id) => Self::UnknownAgent(id.to_string()),
            EngineError::QueueFull => Self::QueueFull,
            EngineError::CommandConflict(_) => Self::CommandConflict,
            EngineError::CommandNotFound(_) => Self::CommandNotFound,
            EngineError::AlreadyDispatched(_) => Self::AlreadyDispatched,
            EngineError::StoreUnavailable(e) => Self::StoreUnavailable(e.to_string()),
            EngineError::ShuttingDown => Self::ShuttingDown,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UnknownAgent(id) => Self::UnknownAgent(id.to_string()),
            StoreError::CommandConflict => Self::CommandConflict,
            StoreError::CommandNotFound => Self::CommandNotFound,
            StoreError::Unavailable(msg) => Self::StoreUnavailable(msg),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Rejected(_) => StatusCode::BAD_REQUEST,
            Self::UnknownAgent(_) | Self::CommandNotFound => StatusCode::NOT_FOUND,
            Self::QueueFull => StatusCode::TOO_MANY_REQUESTS,
            Self::CommandConflict => StatusCode::CONFLICT,
            Self::AlreadyDispatched => StatusCode::CONFLICT,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn reason(&self) -> Option<String> {
        match self {
            Self::Rejected(r) => Some(r.kind().to_string()),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody { error: self.to_string(), reason: self.reason() };
        (status, Json(body)).into_response()
    }
}
