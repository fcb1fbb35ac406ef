//! Variable-instance query resource.

use std::collections::HashMap;

use axum::extract::Query;
use axum::{Extension, Json};
use flowline_core::domain::VariableInstance;
use flowline_core::query::{VariableInstanceQuery, VariableInstanceSortKey};
use flowline_core::EngineError;

use crate::error::AppError;
use crate::handlers::CountResult;
use crate::params::{AppJson, QueryParams};
use crate::router::EngineServices;

pub(crate) fn query_from_params(
    params: &QueryParams,
) -> Result<VariableInstanceQuery, EngineError> {
    Ok(VariableInstanceQuery {
        variable_name: params.string("variableName"),
        variable_name_like: params.string("variableNameLike"),
        process_instance_id_in: params.string_list("processInstanceIdIn"),
        execution_id_in: params.string_list("executionIdIn"),
        case_execution_id_in: params.string_list("caseExecutionIdIn"),
        task_id_in: params.string_list("taskIdIn"),
        activity_instance_id_in: params.string_list("activityInstanceIdIn"),
        variable_values: params.variable_filters("variableValues")?,
        tenant_id_in: params.string_list("tenantIdIn"),
        sorting: params.sorting(VariableInstanceSortKey::from_param)?,
    })
}

pub async fn query_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<VariableInstance>>, AppError> {
    let params = QueryParams::new(params);
    let page = params.pagination()?;
    let query = query_from_params(&params)?;
    Ok(Json(services.variables.find_variable_instances(query, page).await?))
}

pub async fn query_post(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
    AppJson(query): AppJson<VariableInstanceQuery>,
) -> Result<Json<Vec<VariableInstance>>, AppError> {
    let page = QueryParams::new(params).pagination()?;
    Ok(Json(services.variables.find_variable_instances(query, page).await?))
}

pub async fn count_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CountResult>, AppError> {
    let query = query_from_params(&QueryParams::new(params))?;
    let count = services.variables.count_variable_instances(query).await?;
    Ok(Json(CountResult { count }))
}

pub async fn count_post(
    Extension(services): Extension<EngineServices>,
    AppJson(query): AppJson<VariableInstanceQuery>,
) -> Result<Json<CountResult>, AppError> {
    let count = services.variables.count_variable_instances(query).await?;
    Ok(Json(CountResult { count }))
}
