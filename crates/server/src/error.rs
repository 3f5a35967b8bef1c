//! Mapping from pipeline errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cookbook_core::AppError;
use serde_json::json;
use std::time::Duration;

/// Error returned by the chat handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Failure inside the answering pipeline
    App(AppError),

    /// The request did not finish within the configured limit
    Timeout(Duration),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::App(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::App(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::App(e) => e.to_string(),
            ApiError::Timeout(limit) => {
                format!("Request timed out after {}s", limit.as_secs_f64())
            }
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Chat request failed: {}", message);
        } else {
            tracing::warn!(status = status.as_u16(), "Chat request rejected: {}", message);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
