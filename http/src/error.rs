//! HTTP error mapping
//!
//! Translates `TaskError` values (and auth failures that never reach the
//! domain layer) into JSON responses. Client faults keep their specific
//! messages; server faults are logged and rendered as a generic 500 so no
//! internal detail leaks to callers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use taskd_core::error::TaskError;
use thiserror::Error;

/// Errors a handler can surface to the HTTP layer
#[derive(Error, Debug)]
pub enum ApiError {
    /// Failure from the domain or persistence layer
    #[error(transparent)]
    Task(#[from] TaskError),

    /// No usable `Authorization: Bearer` header on a protected route
    #[error("Missing bearer token")]
    MissingToken,

    /// The bearer token failed signature or expiry validation
    #[error("Invalid bearer token")]
    InvalidToken,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Task(err) => {
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let message = match err {
                    TaskError::NotFound(_) => "Task not found".to_string(),
                    TaskError::Validation(message) => message.clone(),
                    TaskError::Conflict(_) => "User already exists".to_string(),
                    TaskError::InvalidCredentials => "Invalid credentials".to_string(),
                    server_fault => {
                        tracing::error!(error = %server_fault, "Request failed on a server fault");
                        "Internal server error".to_string()
                    }
                };
                (status, message)
            }
            ApiError::MissingToken | ApiError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Missing or invalid authorization token".to_string(),
            ),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
