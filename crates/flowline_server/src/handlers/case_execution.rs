//! Case-execution resource (query surface only).

use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::{Extension, Json};
use flowline_core::domain::CaseExecution;
use flowline_core::query::{CaseExecutionQuery, CaseExecutionSortKey};
use flowline_core::EngineError;

use crate::error::AppError;
use crate::handlers::CountResult;
use crate::params::{AppJson, QueryParams};
use crate::router::EngineServices;

pub(crate) fn query_from_params(params: &QueryParams) -> Result<CaseExecutionQuery, EngineError> {
    Ok(CaseExecutionQuery {
        case_execution_id: params.string("caseExecutionId"),
        case_instance_id: params.string("caseInstanceId"),
        case_definition_id: params.string("caseDefinitionId"),
        case_definition_key: params.string("caseDefinitionKey"),
        business_key: params.string("businessKey"),
        activity_id: params.string("activityId"),
        required: params.flag("required")?,
        active: params.flag("active")?,
        enabled: params.flag("enabled")?,
        disabled: params.flag("disabled")?,
        tenant_id_in: params.string_list("tenantIdIn"),
        variables: params.variable_filters("variables")?,
        case_instance_variables: params.variable_filters("caseInstanceVariables")?,
        sorting: params.sorting(CaseExecutionSortKey::from_param)?,
    })
}

pub async fn query_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<CaseExecution>>, AppError> {
    let params = QueryParams::new(params);
    let page = params.pagination()?;
    let query = query_from_params(&params)?;
    Ok(Json(services.cases.find_case_executions(query, page).await?))
}

pub async fn query_post(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
    AppJson(query): AppJson<CaseExecutionQuery>,
) -> Result<Json<Vec<CaseExecution>>, AppError> {
    let page = QueryParams::new(params).pagination()?;
    Ok(Json(services.cases.find_case_executions(query, page).await?))
}

pub async fn count_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CountResult>, AppError> {
    let query = query_from_params(&QueryParams::new(params))?;
    let count = services.cases.count_case_executions(query).await?;
    Ok(Json(CountResult { count }))
}

pub async fn count_post(
    Extension(services): Extension<EngineServices>,
    AppJson(query): AppJson<CaseExecutionQuery>,
) -> Result<Json<CountResult>, AppError> {
    let count = services.cases.count_case_executions(query).await?;
    Ok(Json(CountResult { count }))
}

pub async fn get(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<Json<CaseExecution>, AppError> {
    Ok(Json(services.cases.get_case_execution(&id).await?))
}
