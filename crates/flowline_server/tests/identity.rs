//! User and group resources.

mod support;

use flowline_core::services::{Permission, Resource};
use hyper::StatusCode;

#[tokio::test]
async fn user_query_filters_by_name_parts() {
    let (engine, app) = support::engine_app().await;
    engine.insert_user(support::sample_user()).await;

    let resp = support::get(&app, "/user?firstName=John&lastNameLike=D%25").await;
    let body = support::body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], "jonny1");
    assert_eq!(body[0]["email"], "john.doe@example.org");

    let resp = support::get(&app, "/user?firstName=Jane").await;
    assert!(support::body_json(resp).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn user_query_filters_by_group_membership() {
    let (engine, app) = support::engine_app().await;
    engine.insert_user(support::sample_user()).await;
    engine
        .insert_group(support::sample_group(), vec!["jonny1".into()])
        .await;

    let resp = support::get(&app, "/user?memberOfGroup=groupId1").await;
    assert_eq!(support::body_json(resp).await.as_array().unwrap().len(), 1);

    let resp = support::get(&app, "/user?memberOfGroup=anotherGroup").await;
    assert!(support::body_json(resp).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn user_create_then_fetch_round_trips() {
    let (_engine, app) = support::engine_app().await;
    let resp = support::post_json(
        &app,
        "/user/create",
        serde_json::json!({
            "profile": {"id": "newUser", "firstName": "New", "lastName": "User"},
            "credentials": {"password": "secret"}
        }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let body = support::body_json(support::get(&app, "/user/newUser").await).await;
    assert_eq!(body["firstName"], "New");
    let body = support::body_json(support::get(&app, "/user/newUser/profile").await).await;
    assert_eq!(body["lastName"], "User");
}

#[tokio::test]
async fn user_create_requires_a_profile() {
    let (_engine, app) = support::engine_app().await;
    let resp = support::post_json(&app, "/user/create", serde_json::json!({})).await;
    support::assert_error(
        resp,
        StatusCode::BAD_REQUEST,
        "InvalidRequestException",
        "request object must provide a profile",
    )
    .await;
}

#[tokio::test]
async fn duplicate_user_is_an_engine_error() {
    let (engine, app) = support::engine_app().await;
    engine.insert_user(support::sample_user()).await;

    let resp = support::post_json(
        &app,
        "/user/create",
        serde_json::json!({"profile": {"id": "jonny1"}}),
    )
    .await;
    support::assert_error(
        resp,
        StatusCode::INTERNAL_SERVER_ERROR,
        "ProcessEngineException",
        "The user already exists: jonny1",
    )
    .await;
}

#[tokio::test]
async fn user_delete_removes_group_membership() {
    let (engine, app) = support::engine_app().await;
    engine.insert_user(support::sample_user()).await;
    engine
        .insert_group(support::sample_group(), vec!["jonny1".into()])
        .await;

    let resp = support::delete(&app, "/user/jonny1").await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(support::get(&app, "/user/jonny1").await.status(), StatusCode::NOT_FOUND);

    let resp = support::get(&app, "/user?memberOfGroup=groupId1").await;
    assert!(support::body_json(resp).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn missing_user_is_a_not_found_envelope() {
    let (_engine, app) = support::engine_app().await;
    let resp = support::get(&app, "/user/aNonExistingId").await;
    support::assert_error(
        resp,
        StatusCode::NOT_FOUND,
        "InvalidRequestException",
        "User with id aNonExistingId does not exist.",
    )
    .await;
}

#[tokio::test]
async fn user_options_gate_the_create_link() {
    let (engine, app) = support::engine_app().await;

    let body = support::body_json(support::options(&app, "/user", None).await).await;
    let rels: Vec<&str> = body["links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["rel"].as_str().unwrap())
        .collect();
    assert_eq!(rels, vec!["list", "count", "create"]);

    engine.enable_authorization().await;
    let body = support::body_json(support::options(&app, "/user", Some("jonny1")).await).await;
    assert_eq!(body["links"].as_array().unwrap().len(), 2);

    engine
        .grant("jonny1", Permission::Create, Resource::User, None)
        .await;
    let body = support::body_json(support::options(&app, "/user", Some("jonny1")).await).await;
    assert_eq!(body["links"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn user_count_and_sort_validation() {
    let (engine, app) = support::engine_app().await;
    engine.insert_user(support::sample_user()).await;

    let body = support::body_json(support::get(&app, "/user/count").await).await;
    assert_eq!(body["count"], 1);

    let resp = support::get(&app, "/user?sortBy=userId").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn group_query_filters_by_type_and_member() {
    let (engine, app) = support::engine_app().await;
    engine
        .insert_group(support::sample_group(), vec!["jonny1".into()])
        .await;

    let resp = support::get(&app, "/group?type=organizational-unit&member=jonny1").await;
    let body = support::body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], "groupId1");
    assert_eq!(body[0]["type"], "organizational-unit");

    let resp = support::get(&app, "/group?member=someoneElse").await;
    assert!(support::body_json(resp).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn group_get_and_count() {
    let (engine, app) = support::engine_app().await;
    engine.insert_group(support::sample_group(), Vec::new()).await;

    let body = support::body_json(support::get(&app, "/group/groupId1").await).await;
    assert_eq!(body["name"], "group1");

    let body = support::body_json(support::get(&app, "/group/count").await).await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn missing_group_is_a_not_found_envelope() {
    let (_engine, app) = support::engine_app().await;
    let resp = support::get(&app, "/group/aNonExistingId").await;
    support::assert_error(
        resp,
        StatusCode::NOT_FOUND,
        "InvalidRequestException",
        "Group with id aNonExistingId does not exist.",
    )
    .await;
}
