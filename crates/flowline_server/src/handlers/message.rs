//! Message correlation endpoint.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use flowline_core::query::MessageCorrelation;

use crate::error::AppError;
use crate::params::AppJson;
use crate::router::EngineServices;

/// `POST /message`. Returns 204 unless the caller asked for the correlation
/// result, in which case the matched executions come back as a 200.
pub async fn correlate(
    Extension(services): Extension<EngineServices>,
    AppJson(correlation): AppJson<MessageCorrelation>,
) -> Result<Response, AppError> {
    if correlation.message_name.is_none() {
        return Err(AppError::invalid("No message name supplied"));
    }
    let result_enabled = correlation.result_enabled;
    let results = services.runtime.correlate_message(correlation).await?;
    if result_enabled {
        Ok(Json(results).into_response())
    } else {
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
