use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the `/functions/v1` endpoints, rendered as `{error, details?}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Validation(String),
    /// The primary store or object-store call failed.
    #[error("{message}: {details}")]
    Backend { message: &'static str, details: String },
}

impl ApiError {
    pub fn backend(message: &'static str, err: impl std::fmt::Display) -> Self {
        ApiError::Backend {
            message,
            details: err.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Backend { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Unauthenticated(msg) | ApiError::Forbidden(msg) | ApiError::Validation(msg) => {
                json!({ "error": msg })
            }
            ApiError::Backend { message, details } => {
                error!("{message}: {details}");
                json!({ "error": message, "details": details })
            }
        };
        (status, Json(body)).into_response()
    }
}
