//! Incident resource.

use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::{Extension, Json};
use flowline_core::domain::Incident;
use flowline_core::query::{IncidentQuery, IncidentSortKey};
use flowline_core::EngineError;

use crate::error::AppError;
use crate::handlers::CountResult;
use crate::params::{AppJson, QueryParams};
use crate::router::EngineServices;

pub(crate) fn query_from_params(params: &QueryParams) -> Result<IncidentQuery, EngineError> {
    Ok(IncidentQuery {
        incident_id: params.string("incidentId"),
        incident_type: params.string("incidentType"),
        incident_message: params.string("incidentMessage"),
        process_definition_id: params.string("processDefinitionId"),
        process_instance_id: params.string("processInstanceId"),
        execution_id: params.string("executionId"),
        activity_id: params.string("activityId"),
        cause_incident_id: params.string("causeIncidentId"),
        root_cause_incident_id: params.string("rootCauseIncidentId"),
        configuration: params.string("configuration"),
        job_definition_id_in: params.string_list("jobDefinitionIdIn"),
        tenant_id_in: params.string_list("tenantIdIn"),
        sorting: params.sorting(IncidentSortKey::from_param)?,
    })
}

pub async fn query_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Incident>>, AppError> {
    let params = QueryParams::new(params);
    let page = params.pagination()?;
    let query = query_from_params(&params)?;
    Ok(Json(services.incidents.find_incidents(query, page).await?))
}

pub async fn query_post(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
    AppJson(query): AppJson<IncidentQuery>,
) -> Result<Json<Vec<Incident>>, AppError> {
    let page = QueryParams::new(params).pagination()?;
    Ok(Json(services.incidents.find_incidents(query, page).await?))
}

pub async fn count_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CountResult>, AppError> {
    let query = query_from_params(&QueryParams::new(params))?;
    let count = services.incidents.count_incidents(query).await?;
    Ok(Json(CountResult { count }))
}

pub async fn count_post(
    Extension(services): Extension<EngineServices>,
    AppJson(query): AppJson<IncidentQuery>,
) -> Result<Json<CountResult>, AppError> {
    let count = services.incidents.count_incidents(query).await?;
    Ok(Json(CountResult { count }))
}

pub async fn get(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<Json<Incident>, AppError> {
    Ok(Json(services.incidents.get_incident(&id).await?))
}

pub async fn resolve(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    services.incidents.resolve_incident(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
