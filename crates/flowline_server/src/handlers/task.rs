//! Task resource.
//!
//! GET/POST /task                — query
//! GET/POST /task/count         — query count
//! POST /task/create            — create
//! GET/PUT/DELETE /task/{id}    — single resource
//! POST /task/{id}/claim | unclaim | complete | resolve | delegate
//! GET /task/{id}/variables, GET/PUT/DELETE /task/{id}/variables/{name}
//! OPTIONS /task                — discovery links

use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::{Extension, Json};
use flowline_core::domain::{DelegationState, NewTask, Task, UpdateTask, VariableValue};
use flowline_core::query::{TaskQuery, TaskSortKey};
use flowline_core::services::{Permission, Resource};
use flowline_core::EngineError;
use serde::Deserialize;

use crate::auth::Principal;
use crate::error::AppError;
use crate::handlers::{CountResult, Link, ResourceOptions};
use crate::params::{AppJson, QueryParams};
use crate::router::EngineServices;

pub(crate) fn query_from_params(params: &QueryParams) -> Result<TaskQuery, EngineError> {
    let delegation_state = match params.string("delegationState") {
        None => None,
        Some(raw) => Some(DelegationState::from_str(&raw).ok_or_else(|| {
            EngineError::invalid(format!(
                "Cannot set query parameter 'delegationState' to value '{raw}'"
            ))
        })?),
    };
    Ok(TaskQuery {
        process_instance_id: params.string("processInstanceId"),
        process_instance_business_key: params.string("processInstanceBusinessKey"),
        process_instance_business_key_like: params.string("processInstanceBusinessKeyLike"),
        process_definition_id: params.string("processDefinitionId"),
        process_definition_key: params.string("processDefinitionKey"),
        execution_id: params.string("executionId"),
        case_instance_id: params.string("caseInstanceId"),
        case_execution_id: params.string("caseExecutionId"),
        name: params.string("name"),
        name_like: params.string("nameLike"),
        description: params.string("description"),
        description_like: params.string("descriptionLike"),
        assignee: params.string("assignee"),
        assignee_like: params.string("assigneeLike"),
        owner: params.string("owner"),
        candidate_group: params.string("candidateGroup"),
        candidate_groups: params.string_list("candidateGroups"),
        candidate_user: params.string("candidateUser"),
        involved_user: params.string("involvedUser"),
        priority: params.number("priority")?,
        min_priority: params.number("minPriority")?,
        max_priority: params.number("maxPriority")?,
        due_date: params.date("dueDate")?,
        due_before: params.date("dueBefore")?,
        due_after: params.date("dueAfter")?,
        created_before: params.date("createdBefore")?,
        created_after: params.date("createdAfter")?,
        delegation_state,
        task_definition_key: params.string("taskDefinitionKey"),
        task_definition_key_like: params.string("taskDefinitionKeyLike"),
        unassigned: params.flag("unassigned")?,
        active: params.flag("active")?,
        suspended: params.flag("suspended")?,
        tenant_id_in: params.string_list("tenantIdIn"),
        task_variables: params.variable_filters("taskVariables")?,
        process_variables: params.variable_filters("processVariables")?,
        sorting: params.sorting(TaskSortKey::from_param)?,
    })
}

pub async fn query_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Task>>, AppError> {
    let params = QueryParams::new(params);
    let page = params.pagination()?;
    let query = query_from_params(&params)?;
    Ok(Json(services.tasks.find_tasks(query, page).await?))
}

pub async fn query_post(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
    AppJson(query): AppJson<TaskQuery>,
) -> Result<Json<Vec<Task>>, AppError> {
    let page = QueryParams::new(params).pagination()?;
    Ok(Json(services.tasks.find_tasks(query, page).await?))
}

pub async fn count_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CountResult>, AppError> {
    let query = query_from_params(&QueryParams::new(params))?;
    let count = services.tasks.count_tasks(query).await?;
    Ok(Json(CountResult { count }))
}

pub async fn count_post(
    Extension(services): Extension<EngineServices>,
    AppJson(query): AppJson<TaskQuery>,
) -> Result<Json<CountResult>, AppError> {
    let count = services.tasks.count_tasks(query).await?;
    Ok(Json(CountResult { count }))
}

pub async fn create(
    Extension(services): Extension<EngineServices>,
    AppJson(new_task): AppJson<NewTask>,
) -> Result<StatusCode, AppError> {
    services.tasks.create_task(new_task).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<Json<Task>, AppError> {
    Ok(Json(services.tasks.get_task(&id).await?))
}

pub async fn update(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
    AppJson(update): AppJson<UpdateTask>,
) -> Result<StatusCode, AppError> {
    services.tasks.update_task(&id, update).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    services.tasks.delete_task(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserIdBody {
    pub user_id: Option<String>,
}

pub async fn claim(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
    body: Option<AppJson<UserIdBody>>,
) -> Result<StatusCode, AppError> {
    let user_id = body.and_then(|AppJson(b)| b.user_id);
    services.tasks.claim(&id, user_id.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unclaim(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    services.tasks.set_assignee(&id, None).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_assignee(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
    body: Option<AppJson<UserIdBody>>,
) -> Result<StatusCode, AppError> {
    let user_id = body.and_then(|AppJson(b)| b.user_id);
    services.tasks.set_assignee(&id, user_id.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VariablesBody {
    pub variables: HashMap<String, VariableValue>,
}

pub async fn complete(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
    body: Option<AppJson<VariablesBody>>,
) -> Result<StatusCode, AppError> {
    let variables = body.map(|AppJson(b)| b.variables).unwrap_or_default();
    services.tasks.complete(&id, variables).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn resolve(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
    body: Option<AppJson<VariablesBody>>,
) -> Result<StatusCode, AppError> {
    let variables = body.map(|AppJson(b)| b.variables).unwrap_or_default();
    services.tasks.resolve(&id, variables).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delegate(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
    AppJson(body): AppJson<UserIdBody>,
) -> Result<StatusCode, AppError> {
    let user_id = body
        .user_id
        .ok_or_else(|| AppError::invalid("No userId provided to delegate the task to"))?;
    services.tasks.delegate(&id, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn variables(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<Json<HashMap<String, VariableValue>>, AppError> {
    Ok(Json(services.tasks.get_task_variables(&id).await?))
}

pub async fn get_variable(
    Extension(services): Extension<EngineServices>,
    Path((id, name)): Path<(String, String)>,
) -> Result<Json<VariableValue>, AppError> {
    Ok(Json(services.tasks.get_task_variable(&id, &name).await?))
}

pub async fn put_variable(
    Extension(services): Extension<EngineServices>,
    Path((id, name)): Path<(String, String)>,
    AppJson(value): AppJson<VariableValue>,
) -> Result<StatusCode, AppError> {
    services.tasks.put_task_variable(&id, &name, value).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_variable(
    Extension(services): Extension<EngineServices>,
    Path((id, name)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    services.tasks.remove_task_variable(&id, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn options(
    Extension(services): Extension<EngineServices>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ResourceOptions>, AppError> {
    let mut links = vec![Link::new("GET", "/task", "self")];
    if services
        .authorizations
        .is_user_authorized(principal.user(), Permission::Create, Resource::Task, None)
        .await?
    {
        links.push(Link::new("POST", "/task/create", "create"));
    }
    Ok(Json(ResourceOptions { links }))
}
