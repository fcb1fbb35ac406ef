//! Identity resources: users and groups.

use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::{Extension, Json};
use flowline_core::domain::{Group, NewUser, User};
use flowline_core::query::{GroupQuery, GroupSortKey, UserQuery, UserSortKey};
use flowline_core::services::{Permission, Resource};
use flowline_core::EngineError;

use crate::auth::Principal;
use crate::error::AppError;
use crate::handlers::{CountResult, Link, ResourceOptions};
use crate::params::{AppJson, QueryParams};
use crate::router::EngineServices;

pub(crate) fn user_query_from_params(params: &QueryParams) -> Result<UserQuery, EngineError> {
    Ok(UserQuery {
        id: params.string("id"),
        first_name: params.string("firstName"),
        first_name_like: params.string("firstNameLike"),
        last_name: params.string("lastName"),
        last_name_like: params.string("lastNameLike"),
        email: params.string("email"),
        email_like: params.string("emailLike"),
        member_of_group: params.string("memberOfGroup"),
        sorting: params.sorting(UserSortKey::from_param)?,
    })
}

pub async fn user_query_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<User>>, AppError> {
    let params = QueryParams::new(params);
    let page = params.pagination()?;
    let query = user_query_from_params(&params)?;
    Ok(Json(services.identity.find_users(query, page).await?))
}

pub async fn user_count_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CountResult>, AppError> {
    let query = user_query_from_params(&QueryParams::new(params))?;
    let count = services.identity.count_users(query).await?;
    Ok(Json(CountResult { count }))
}

pub async fn user_get(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    Ok(Json(services.identity.get_user(&id).await?))
}

pub async fn user_create(
    Extension(services): Extension<EngineServices>,
    AppJson(new_user): AppJson<NewUser>,
) -> Result<StatusCode, AppError> {
    services.identity.create_user(new_user).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn user_delete(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    services.identity.delete_user(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn user_options(
    Extension(services): Extension<EngineServices>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ResourceOptions>, AppError> {
    let mut links = vec![
        Link::new("GET", "/user", "list"),
        Link::new("GET", "/user/count", "count"),
    ];
    if services
        .authorizations
        .is_user_authorized(principal.user(), Permission::Create, Resource::User, None)
        .await?
    {
        links.push(Link::new("POST", "/user/create", "create"));
    }
    Ok(Json(ResourceOptions { links }))
}

pub(crate) fn group_query_from_params(params: &QueryParams) -> Result<GroupQuery, EngineError> {
    Ok(GroupQuery {
        id: params.string("id"),
        name: params.string("name"),
        name_like: params.string("nameLike"),
        group_type: params.string("type"),
        member: params.string("member"),
        sorting: params.sorting(GroupSortKey::from_param)?,
    })
}

pub async fn group_query_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Group>>, AppError> {
    let params = QueryParams::new(params);
    let page = params.pagination()?;
    let query = group_query_from_params(&params)?;
    Ok(Json(services.identity.find_groups(query, page).await?))
}

pub async fn group_count_get(
    Extension(services): Extension<EngineServices>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CountResult>, AppError> {
    let query = group_query_from_params(&QueryParams::new(params))?;
    let count = services.identity.count_groups(query).await?;
    Ok(Json(CountResult { count }))
}

pub async fn group_get(
    Extension(services): Extension<EngineServices>,
    Path(id): Path<String>,
) -> Result<Json<Group>, AppError> {
    Ok(Json(services.identity.get_group(&id).await?))
}
