//! Job resource: query, retries, synchronous execution, suspension.

use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::{Extension, Json};
use flowline_core::domain::Job;
use flowline_core::query::{Comparator, DateFilter, JobQuery, JobSortKey};
use flowline_core::EngineError;
use serde::Deserialize;

use crate::error::AppError;
use crate::handlers::CountResult;
use crate::params::{parse_date, AppJson, QueryParams};
use crate::router::EngineServices;

/// `dueDates=gt_<date>,lt_<date>` — only the ordering comparators apply to
/// job due dates.
fn due_date_filters(params: &QueryParams) -> Result<Vec<DateFilter>, EngineError> {
    params
        .string_list("dueDates")
        .iter()
        .map(|expr| {
            let (op, raw) = expr.split_once('_').ok_or_else(|| {
                EngineError::invalid("due date query parameter has to have format OPERATOR_VALUE")
            })?;
            let operator = match Comparator::from_str(op) {
                Some(op @ (Comparator::Gt | Comparator::Lt)) => op,
                _ => {
                    return Err(EngineError::invalid(format!(
                        "Invalid due date comparator specified: {op}"
                    )))
                }
            };
            let value = parse_date(raw).ok_or_else(|| {
                EngineError::invalid(format!("Cannot set query parameter 'dueDates' to value '{raw}'"))
            })?;
            Ok(DateFilter { operator, value })
        })
        .collect()
}

pub(crate) fn query_from_params(params: &QueryParams) -> Result<JobQuery, EngineError> {
    Ok(JobQuery {
        job_id: params.string("jobId"),
        job_definition_id: params.string("jobDefinitionId"),
        process_instance_id: params.string("processInstanceId"),
        process_definition_id: params.string("processDefinitionId"),
        process_definition_key: params.string("processDefinitionKey"),
        execution_id: params.string("executionId"),
        active: params.flag("active")?,
        suspended: params.flag("suspended")?,
        with_retries_left: params.flag("withRetriesLeft")?,
        no_retries_left: params.flag("noRetriesLeft")?,
        executable: params.flag("executable")?,
        timers: params.flag("timers")?,
        messages: params.flag("messages")?,
        with_exception: params.flag("withException")?,
        exception_message: params.string("exceptionMessage"),
        due_dates: due_date_filters(params)?,
        priority_higher_than_or_equals: params.number("priorityHigherThanOrEquals")?,
        priority_lower_than_or_equals: params.number("priorityLowerThanOrEquals")?,
        tenant_id_in: params.string_list("tenantIdIn"),
        sorting: params.sorting(JobSortKey::from_param)?,
    })
}

pub async fn query_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Job>>, AppError> {
    let params = QueryParams::new(params);
    let page = params.pagination()?;
    let query = query_from_params(&params)?;
    Ok(Json(services.management.find_jobs(query, page).await?))
}

pub async fn query_post(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
    AppJson(query): AppJson<JobQuery>,
) -> Result<Json<Vec<Job>>, AppError> {
    let page = QueryParams::new(params).pagination()?;
    Ok(Json(services.management.find_jobs(query, page).await?))
}

pub async fn count_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CountResult>, AppError> {
    let query = query_from_params(&QueryParams::new(params))?;
    let count = services.management.count_jobs(query).await?;
    Ok(Json(CountResult { count }))
}

pub async fn count_post(
    Extension(services): Extension<EngineServices>,
    AppJson(query): AppJson<JobQuery>,
) -> Result<Json<CountResult>, AppError> {
    let count = services.management.count_jobs(query).await?;
    Ok(Json(CountResult { count }))
}

pub async fn get(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<Json<Job>, AppError> {
    Ok(Json(services.management.get_job(&id).await?))
}

pub async fn delete(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    services.management.delete_job(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RetriesBody {
    pub retries: Option<i32>,
}

pub async fn set_retries(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
    AppJson(body): AppJson<RetriesBody>,
) -> Result<StatusCode, AppError> {
    let retries = validate_retries(body.retries)?;
    services.management.set_job_retries(&id, retries).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn validate_retries(retries: Option<i32>) -> Result<u32, AppError> {
    match retries {
        Some(n) if n >= 0 => Ok(n as u32),
        Some(n) => Err(AppError::invalid(format!(
            "The number of job retries must be a non-negative Integer, but '{n}' has been provided."
        ))),
        None => Err(AppError::invalid(
            "The number of job retries must be a non-negative Integer, but 'null' has been provided.",
        )),
    }
}

pub async fn execute(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    services.management.execute_job(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuspensionBody {
    pub suspended: bool,
}

pub async fn set_suspended(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
    AppJson(body): AppJson<SuspensionBody>,
) -> Result<StatusCode, AppError> {
    services.management.set_job_suspension(&id, body.suspended).await?;
    Ok(StatusCode::NO_CONTENT)
}
