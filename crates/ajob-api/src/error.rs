use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::signature::SignatureError;

/// Errors surfaced to the webhook sender.
///
/// Response bodies carry a short reason only; internal failure detail stays in the logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid signature: {0}")]
    InvalidSignature(#[from] SignatureError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unsupported event: {0}")]
    UnsupportedEvent(String),

    #[error("rejected: {0}")]
    Rejected(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidSignature(_) | ApiError::InvalidRequest(_) | ApiError::Rejected(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::UnsupportedEvent(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match &self {
            ApiError::InvalidSignature(_) => "invalid signature".to_string(),
            ApiError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        (self.status_code(), body).into_response()
    }
}
