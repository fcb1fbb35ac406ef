//! Process-instance resource: query, single lookup, suspension, variables.

use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::{Extension, Json};
use flowline_core::domain::{ProcessInstance, VariableValue};
use flowline_core::query::{ProcessInstanceQuery, ProcessInstanceSortKey};
use flowline_core::EngineError;
use serde::Deserialize;

use crate::error::AppError;
use crate::handlers::CountResult;
use crate::params::{AppJson, QueryParams};
use crate::router::EngineServices;

pub(crate) fn query_from_params(
    params: &QueryParams,
) -> Result<ProcessInstanceQuery, EngineError> {
    Ok(ProcessInstanceQuery {
        process_instance_ids: params.string_list("processInstanceIds"),
        business_key: params.string("businessKey"),
        business_key_like: params.string("businessKeyLike"),
        case_instance_id: params.string("caseInstanceId"),
        process_definition_id: params.string("processDefinitionId"),
        process_definition_key: params.string("processDefinitionKey"),
        super_process_instance: params.string("superProcessInstance"),
        sub_process_instance: params.string("subProcessInstance"),
        active: params.flag("active")?,
        suspended: params.flag("suspended")?,
        incident_id: params.string("incidentId"),
        incident_type: params.string("incidentType"),
        tenant_id_in: params.string_list("tenantIdIn"),
        variables: params.variable_filters("variables")?,
        sorting: params.sorting(ProcessInstanceSortKey::from_param)?,
    })
}

pub async fn query_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<ProcessInstance>>, AppError> {
    let params = QueryParams::new(params);
    let page = params.pagination()?;
    let query = query_from_params(&params)?;
    Ok(Json(services.runtime.find_process_instances(query, page).await?))
}

pub async fn query_post(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
    AppJson(query): AppJson<ProcessInstanceQuery>,
) -> Result<Json<Vec<ProcessInstance>>, AppError> {
    let page = QueryParams::new(params).pagination()?;
    Ok(Json(services.runtime.find_process_instances(query, page).await?))
}

pub async fn count_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CountResult>, AppError> {
    let query = query_from_params(&QueryParams::new(params))?;
    let count = services.runtime.count_process_instances(query).await?;
    Ok(Json(CountResult { count }))
}

pub async fn count_post(
    Extension(services): Extension<EngineServices>,
    AppJson(query): AppJson<ProcessInstanceQuery>,
) -> Result<Json<CountResult>, AppError> {
    let count = services.runtime.count_process_instances(query).await?;
    Ok(Json(CountResult { count }))
}

pub async fn get(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<Json<ProcessInstance>, AppError> {
    Ok(Json(services.runtime.get_process_instance(&id).await?))
}

pub async fn delete(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    services.runtime.delete_process_instance(&id).await?;
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
    services
        .runtime
        .set_process_instance_suspension(&id, body.suspended)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn variables(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<Json<HashMap<String, VariableValue>>, AppError> {
    Ok(Json(services.runtime.get_instance_variables(&id).await?))
}

pub async fn get_variable(
    Extension(services): Extension<EngineServices>,
    Path((id, name)): Path<(String, String)>,
) -> Result<Json<VariableValue>, AppError> {
    Ok(Json(services.runtime.get_instance_variable(&id, &name).await?))
}

pub async fn put_variable(
    Extension(services): Extension<EngineServices>,
    Path((id, name)): Path<(String, String)>,
    AppJson(value): AppJson<VariableValue>,
) -> Result<StatusCode, AppError> {
    services.runtime.put_instance_variable(&id, &name, value).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_variable(
    Extension(services): Extension<EngineServices>,
    Path((id, name)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    services.runtime.remove_instance_variable(&id, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}
