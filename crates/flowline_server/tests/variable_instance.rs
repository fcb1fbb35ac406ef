//! Variable-instance query contract.

mod support;

use std::collections::HashMap;

use flowline_core::domain::VariableValue;
use flowline_core::services::TaskService;
use hyper::StatusCode;

async fn seeded_app() -> axum::Router {
    let (engine, app) = support::engine_app().await;
    let mut vars = HashMap::new();
    vars.insert("amount".to_string(), VariableValue::Integer(10));
    vars.insert("customer".to_string(), VariableValue::String("aCustomer".into()));
    engine
        .insert_process_instance(support::sample_process_instance(), vars)
        .await;
    engine.insert_task(support::sample_task()).await;
    engine
        .put_task_variable("anId", "note", VariableValue::String("aNote".into()))
        .await
        .unwrap();
    app
}

#[tokio::test]
async fn query_by_name_returns_the_instance_variable() {
    let app = seeded_app().await;
    let resp = support::get(&app, "/variable-instance?variableName=amount").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = support::body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "amount");
    assert_eq!(body[0]["value"], 10);
    assert_eq!(body[0]["type"], "Integer");
    assert_eq!(body[0]["processInstanceId"], "aProcInstId");
}

#[tokio::test]
async fn query_by_task_scope() {
    let app = seeded_app().await;
    let resp = support::get(&app, "/variable-instance?taskIdIn=anId").await;
    let body = support::body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "note");
    assert_eq!(body[0]["taskId"], "anId");
}

#[tokio::test]
async fn variable_value_expressions_filter() {
    let app = seeded_app().await;
    let resp = support::get(&app, "/variable-instance?variableValues=amount_gteq_10").await;
    assert_eq!(support::body_json(resp).await.as_array().unwrap().len(), 1);

    let resp = support::get(&app, "/variable-instance?variableValues=amount_lt_10").await;
    assert!(support::body_json(resp).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn activity_instance_scope_filters() {
    let app = seeded_app().await;
    let resp = support::get(&app, "/variable-instance?activityInstanceIdIn=anExecution").await;
    let body = support::body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "note");

    let resp =
        support::get(&app, "/variable-instance?activityInstanceIdIn=anUnknownActivity").await;
    assert!(support::body_json(resp).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn count_covers_all_scopes() {
    let app = seeded_app().await;
    let body = support::body_json(support::get(&app, "/variable-instance/count").await).await;
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn sorting_requires_both_parameters() {
    let app = seeded_app().await;
    let resp = support::get(&app, "/variable-instance?sortBy=variableName").await;
    support::assert_error(
        resp,
        StatusCode::BAD_REQUEST,
        "InvalidRequestException",
        "Only a single sorting parameter specified. sortBy and sortOrder required",
    )
    .await;
}

#[tokio::test]
async fn post_query_binds_the_body() {
    let app = seeded_app().await;
    let resp = support::post_json(
        &app,
        "/variable-instance",
        serde_json::json!({"variableNameLike": "%mount"}),
    )
    .await;
    let body = support::body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "amount");
}
