//! Job-definition resource: query plus suspension and retry overrides that
//! cascade to the definition's jobs.

use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use flowline_core::domain::JobDefinition;
use flowline_core::query::{JobDefinitionQuery, JobDefinitionSortKey};
use flowline_core::EngineError;
use serde::Deserialize;

use crate::error::AppError;
use crate::handlers::{job, CountResult};
use crate::params::{parse_date, AppJson, QueryParams};
use crate::router::EngineServices;

pub(crate) fn query_from_params(params: &QueryParams) -> Result<JobDefinitionQuery, EngineError> {
    Ok(JobDefinitionQuery {
        job_definition_id: params.string("jobDefinitionId"),
        activity_id_in: params.string_list("activityIdIn"),
        process_definition_id: params.string("processDefinitionId"),
        process_definition_key: params.string("processDefinitionKey"),
        job_type: params.string("jobType"),
        job_configuration: params.string("jobConfiguration"),
        active: params.flag("active")?,
        suspended: params.flag("suspended")?,
        with_overriding_job_priority: params.flag("withOverridingJobPriority")?,
        tenant_id_in: params.string_list("tenantIdIn"),
        sorting: params.sorting(JobDefinitionSortKey::from_param)?,
    })
}

pub async fn query_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<JobDefinition>>, AppError> {
    let params = QueryParams::new(params);
    let page = params.pagination()?;
    let query = query_from_params(&params)?;
    Ok(Json(services.management.find_job_definitions(query, page).await?))
}

pub async fn query_post(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
    AppJson(query): AppJson<JobDefinitionQuery>,
) -> Result<Json<Vec<JobDefinition>>, AppError> {
    let page = QueryParams::new(params).pagination()?;
    Ok(Json(services.management.find_job_definitions(query, page).await?))
}

pub async fn count_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CountResult>, AppError> {
    let query = query_from_params(&QueryParams::new(params))?;
    let count = services.management.count_job_definitions(query).await?;
    Ok(Json(CountResult { count }))
}

pub async fn count_post(
    Extension(services): Extension<EngineServices>,
    AppJson(query): AppJson<JobDefinitionQuery>,
) -> Result<Json<CountResult>, AppError> {
    let count = services.management.count_job_definitions(query).await?;
    Ok(Json(CountResult { count }))
}

pub async fn get(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<Json<JobDefinition>, AppError> {
    Ok(Json(services.management.get_job_definition(&id).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuspensionBody {
    pub suspended: bool,
    pub include_jobs: bool,
    pub execution_date: Option<String>,
}

impl SuspensionBody {
    fn execution_date(&self) -> Result<Option<DateTime<Utc>>, AppError> {
        match &self.execution_date {
            None => Ok(None),
            Some(raw) => parse_date(raw).map(Some).ok_or_else(|| {
                AppError::invalid(format!(
                    "The suspension state date could not be set: cannot parse '{raw}'"
                ))
            }),
        }
    }
}

pub async fn set_suspended(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
    AppJson(body): AppJson<SuspensionBody>,
) -> Result<StatusCode, AppError> {
    let execution_date = body.execution_date()?;
    if body.suspended {
        services
            .management
            .suspend_job_definition(&id, body.include_jobs, execution_date)
            .await?;
    } else {
        services
            .management
            .activate_job_definition(&id, body.include_jobs, execution_date)
            .await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_retries(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
    AppJson(body): AppJson<job::RetriesBody>,
) -> Result<StatusCode, AppError> {
    let retries = job::validate_retries(body.retries)?;
    services
        .management
        .set_job_retries_by_definition(&id, retries)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
