//! Handler error type and the `{"type", "message"}` envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use flowline_core::EngineError;
use serde::{Deserialize, Serialize};

/// Wire shape of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

/// Handler-level error — everything funnels through [`EngineError`] so the
/// envelope mapping lives in one place.
#[derive(Debug)]
pub struct AppError(pub EngineError);

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let envelope = ErrorEnvelope {
            error_type: self.0.error_type().to_string(),
            message: self.0.to_string(),
        };
        (status, Json(envelope)).into_response()
    }
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self(EngineError::invalid(message))
    }
}
