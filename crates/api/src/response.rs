//! Response bodies and the API error type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use history_core::{cleared_message, HistoryEntry};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Message returned with a tracked view.
pub const TRACKED_MESSAGE: &str = "Browsing history tracked successfully";

/// Body of a successful track.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrackResponse {
    pub message: String,
    pub created: bool,
    pub data: HistoryEntry,
}

impl TrackResponse {
    pub fn new(data: HistoryEntry, created: bool) -> Self {
        Self {
            message: TRACKED_MESSAGE.to_string(),
            created,
            data,
        }
    }
}

/// `{count, results}` listing body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub count: usize,
    pub results: Vec<T>,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(results: Vec<T>) -> Self {
        Self {
            count: results.len(),
            results,
        }
    }
}

/// Body of a clear.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    pub message: String,
    pub cleared: u64,
}

impl ClearResponse {
    pub fn new(cleared: u64) -> Self {
        Self {
            message: cleared_message(cleared),
            cleared,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database_connected: bool,
    pub auth_connected: bool,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// API error with a stable error code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
        }
    }

    /// Server-side failure. The caller only sees a generic message.
    pub fn internal(code: impl Into<String>) -> Self {
        Self::with_code(
            StatusCode::INTERNAL_SERVER_ERROR,
            code,
            "Internal server error",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<history_core::Error> for ApiError {
    fn from(err: history_core::Error) -> Self {
        if !err.is_client_error() {
            error!(code = err.error_code(), error = %err, "Request failed");
            return ApiError::internal(err.error_code());
        }

        let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::BAD_REQUEST);
        let message = err.client_message().unwrap_or_else(|| err.to_string());

        ApiError::with_code(status, err.error_code(), message)
    }
}
