//! Filter resource: stored task queries, executed directly or extended by an
//! ad-hoc query in the request body.

use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::{Extension, Json};
use flowline_core::domain::{Filter, NewFilter, Task};
use flowline_core::query::TaskQuery;
use flowline_core::services::{Permission, Resource};
use flowline_core::EngineError;

use crate::auth::Principal;
use crate::error::AppError;
use crate::handlers::{task, CountResult, Link, ResourceOptions};
use crate::params::{AppJson, QueryParams};
use crate::router::EngineServices;

pub async fn list(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Filter>>, AppError> {
    let params = QueryParams::new(params);
    let page = params.pagination()?;
    let resource_type = params.string("resourceType");
    Ok(Json(services.filters.find_filters(resource_type.as_deref(), page).await?))
}

pub async fn count(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CountResult>, AppError> {
    let resource_type = QueryParams::new(params).string("resourceType");
    let count = services.filters.count_filters(resource_type.as_deref()).await?;
    Ok(Json(CountResult { count }))
}

pub async fn get(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<Json<Filter>, AppError> {
    Ok(Json(services.filters.get_filter(&id).await?))
}

pub async fn create(
    Extension(services): Extension<EngineServices>,
    AppJson(new_filter): AppJson<NewFilter>,
) -> Result<Json<Filter>, AppError> {
    Ok(Json(services.filters.create_filter(new_filter).await?))
}

pub async fn update(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
    AppJson(update): AppJson<NewFilter>,
) -> Result<StatusCode, AppError> {
    services.filters.update_filter(&id, update).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    services.filters.delete_filter(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The GET execution variants extend the stored query with any task query
/// parameters present on the request.
fn extension_from_params(params: &QueryParams) -> Result<Option<TaskQuery>, EngineError> {
    let query = task::query_from_params(params)?;
    if query == TaskQuery::default() {
        Ok(None)
    } else {
        Ok(Some(query))
    }
}

pub async fn execute_list_get(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Task>>, AppError> {
    let params = QueryParams::new(params);
    let page = params.pagination()?;
    let extending = extension_from_params(&params)?;
    Ok(Json(services.filters.execute_list(&id, extending, page).await?))
}

pub async fn execute_list_post(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    body: Option<AppJson<TaskQuery>>,
) -> Result<Json<Vec<Task>>, AppError> {
    let page = QueryParams::new(params).pagination()?;
    let extending = body.map(|AppJson(q)| q);
    Ok(Json(services.filters.execute_list(&id, extending, page).await?))
}

pub async fn execute_single_get(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<Json<Option<Task>>, AppError> {
    Ok(Json(services.filters.execute_single(&id, None).await?))
}

pub async fn execute_single_post(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
    body: Option<AppJson<TaskQuery>>,
) -> Result<Json<Option<Task>>, AppError> {
    let extending = body.map(|AppJson(q)| q);
    Ok(Json(services.filters.execute_single(&id, extending).await?))
}

pub async fn execute_count_get(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CountResult>, AppError> {
    let extending = extension_from_params(&QueryParams::new(params))?;
    let count = services.filters.execute_count(&id, extending).await?;
    Ok(Json(CountResult { count }))
}

pub async fn execute_count_post(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
    body: Option<AppJson<TaskQuery>>,
) -> Result<Json<CountResult>, AppError> {
    let extending = body.map(|AppJson(q)| q);
    let count = services.filters.execute_count(&id, extending).await?;
    Ok(Json(CountResult { count }))
}

pub async fn options(
    Extension(services): Extension<EngineServices>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ResourceOptions>, AppError> {
    let mut links = vec![
        Link::new("GET", "/filter", "list"),
        Link::new("GET", "/filter/count", "count"),
    ];
    if services
        .authorizations
        .is_user_authorized(principal.user(), Permission::Create, Resource::Filter, None)
        .await?
    {
        links.push(Link::new("POST", "/filter/create", "create"));
    }
    Ok(Json(ResourceOptions { links }))
}

pub async fn resource_options(
    Extension(services): Extension<EngineServices>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<ResourceOptions>, AppError> {
    let user = principal.user();
    let mut links = Vec::new();
    if services
        .authorizations
        .is_user_authorized(user, Permission::Read, Resource::Filter, Some(&id))
        .await?
    {
        links.push(Link::new("GET", format!("/filter/{id}"), "self"));
        links.push(Link::new("GET", format!("/filter/{id}/singleResult"), "singleResult"));
        links.push(Link::new("GET", format!("/filter/{id}/list"), "list"));
        links.push(Link::new("GET", format!("/filter/{id}/count"), "count"));
    }
    if services
        .authorizations
        .is_user_authorized(user, Permission::Update, Resource::Filter, Some(&id))
        .await?
    {
        links.push(Link::new("PUT", format!("/filter/{id}"), "update"));
    }
    if services
        .authorizations
        .is_user_authorized(user, Permission::Delete, Resource::Filter, Some(&id))
        .await?
    {
        links.push(Link::new("DELETE", format!("/filter/{id}"), "delete"));
    }
    Ok(Json(ResourceOptions { links }))
}
