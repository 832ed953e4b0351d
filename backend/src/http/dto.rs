//! Data Transfer Objects for the HTTP API.
//!
//! Resource payloads are the model types themselves; only the shared
//! envelope and the health probe live here.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// `{"status": <code>, "message": <text>}` body used for errors and for
/// operations without a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: u16,
    pub message: String,
}

impl Envelope {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
        }
    }

    /// `{"status":200,"message":"success"}`
    pub fn success() -> Self {
        Self::new(StatusCode::OK, "success")
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Crate version
    pub version: String,
    /// Database connection status
    pub database: String,
}
