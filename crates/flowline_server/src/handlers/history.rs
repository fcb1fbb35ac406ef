//! History resources: finished process instances and their variable log.

use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::{Extension, Json};
use flowline_core::domain::{HistoricProcessInstance, HistoricVariableInstance};
use flowline_core::query::{
    HistoricProcessInstanceQuery, HistoricProcessInstanceSortKey, HistoricVariableInstanceQuery,
    HistoricVariableInstanceSortKey,
};
use flowline_core::EngineError;

use crate::error::AppError;
use crate::handlers::CountResult;
use crate::params::{AppJson, QueryParams};
use crate::router::EngineServices;

pub(crate) fn process_instance_query_from_params(
    params: &QueryParams,
) -> Result<HistoricProcessInstanceQuery, EngineError> {
    Ok(HistoricProcessInstanceQuery {
        process_instance_id: params.string("processInstanceId"),
        process_instance_ids: params.string_list("processInstanceIds"),
        process_definition_id: params.string("processDefinitionId"),
        process_definition_key: params.string("processDefinitionKey"),
        process_instance_business_key: params.string("processInstanceBusinessKey"),
        process_instance_business_key_like: params.string("processInstanceBusinessKeyLike"),
        finished: params.flag("finished")?,
        unfinished: params.flag("unfinished")?,
        started_before: params.date("startedBefore")?,
        started_after: params.date("startedAfter")?,
        finished_before: params.date("finishedBefore")?,
        finished_after: params.date("finishedAfter")?,
        started_by: params.string("startedBy"),
        tenant_id_in: params.string_list("tenantIdIn"),
        variables: params.variable_filters("variables")?,
        sorting: params.sorting(HistoricProcessInstanceSortKey::from_param)?,
    })
}

pub async fn process_instance_query_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<HistoricProcessInstance>>, AppError> {
    let params = QueryParams::new(params);
    let page = params.pagination()?;
    let query = process_instance_query_from_params(&params)?;
    Ok(Json(
        services.history.find_historic_process_instances(query, page).await?,
    ))
}

pub async fn process_instance_query_post(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
    AppJson(query): AppJson<HistoricProcessInstanceQuery>,
) -> Result<Json<Vec<HistoricProcessInstance>>, AppError> {
    let page = QueryParams::new(params).pagination()?;
    Ok(Json(
        services.history.find_historic_process_instances(query, page).await?,
    ))
}

pub async fn process_instance_count_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CountResult>, AppError> {
    let query = process_instance_query_from_params(&QueryParams::new(params))?;
    let count = services.history.count_historic_process_instances(query).await?;
    Ok(Json(CountResult { count }))
}

pub async fn process_instance_count_post(
    Extension(services): Extension<EngineServices>,
    AppJson(query): AppJson<HistoricProcessInstanceQuery>,
) -> Result<Json<CountResult>, AppError> {
    let count = services.history.count_historic_process_instances(query).await?;
    Ok(Json(CountResult { count }))
}

pub async fn process_instance_get(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<Json<HistoricProcessInstance>, AppError> {
    Ok(Json(services.history.get_historic_process_instance(&id).await?))
}

pub async fn process_instance_delete(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    services.history.delete_historic_process_instance(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn variable_query_from_params(
    params: &QueryParams,
) -> Result<HistoricVariableInstanceQuery, EngineError> {
    Ok(HistoricVariableInstanceQuery {
        variable_name: params.string("variableName"),
        variable_name_like: params.string("variableNameLike"),
        variable_value: params.variable_filters("variableValues")?.into_iter().next(),
        process_instance_id: params.string("processInstanceId"),
        task_id_in: params.string_list("taskIdIn"),
        tenant_id_in: params.string_list("tenantIdIn"),
        sorting: params.sorting(HistoricVariableInstanceSortKey::from_param)?,
    })
}

pub async fn variable_query_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<HistoricVariableInstance>>, AppError> {
    let params = QueryParams::new(params);
    let page = params.pagination()?;
    let query = variable_query_from_params(&params)?;
    Ok(Json(
        services.history.find_historic_variable_instances(query, page).await?,
    ))
}

pub async fn variable_query_post(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
    AppJson(query): AppJson<HistoricVariableInstanceQuery>,
) -> Result<Json<Vec<HistoricVariableInstance>>, AppError> {
    let page = QueryParams::new(params).pagination()?;
    Ok(Json(
        services.history.find_historic_variable_instances(query, page).await?,
    ))
}

pub async fn variable_count_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CountResult>, AppError> {
    let query = variable_query_from_params(&QueryParams::new(params))?;
    let count = services.history.count_historic_variable_instances(query).await?;
    Ok(Json(CountResult { count }))
}

pub async fn variable_count_post(
    Extension(services): Extension<EngineServices>,
    AppJson(query): AppJson<HistoricVariableInstanceQuery>,
) -> Result<Json<CountResult>, AppError> {
    let count = services.history.count_historic_variable_instances(query).await?;
    Ok(Json(CountResult { count }))
}
