//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::Envelope;

/// Application error type for HTTP handlers.
///
/// An empty message falls back to the status's default text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Malformed body or failed validation
    BadRequest(String),
    /// Resource not found
    NotFound(String),
    /// Duplicate key or rejected write
    Conflict(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message sent to the client.
    pub fn message(&self) -> &str {
        let (AppError::BadRequest(msg)
        | AppError::NotFound(msg)
        | AppError::Conflict(msg)
        | AppError::Internal(msg)) = self;

        if !msg.is_empty() {
            return msg;
        }
        match self {
            AppError::BadRequest(_) => "Bad request",
            AppError::NotFound(_) => "Not found",
            AppError::Conflict(_) => "Conflict",
            AppError::Internal(_) => "Internal server error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(Envelope::new(status, self.message()))).into_response()
    }
}
