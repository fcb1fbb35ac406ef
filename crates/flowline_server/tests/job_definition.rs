//! Job-definition resource contract.

mod support;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hyper::StatusCode;
use mockall::predicate::eq;
use support::MockManagement;

#[tokio::test]
async fn query_filters_by_type_and_key() {
    let (engine, app) = support::engine_app().await;
    engine.insert_job_definition(support::sample_job_definition()).await;

    let resp = support::get(&app, "/job-definition?jobType=aJobType&processDefinitionKey=aProcDefKey").await;
    let body = support::body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], "aJobDefId");

    let resp = support::get(&app, "/job-definition?jobType=anotherJobType").await;
    let body = support::body_json(resp).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn suspend_delegates_with_include_jobs() {
    let mut mock = MockManagement::new();
    mock.expect_suspend_job_definition()
        .with(eq("aJobDefId"), eq(true), eq(None::<DateTime<Utc>>))
        .times(1)
        .returning(|_, _, _| Ok(()));
    let mut services = support::engine_services();
    services.management = Arc::new(mock);
    let app = support::app_with(services);

    let resp = support::put_json(
        &app,
        "/job-definition/aJobDefId/suspended",
        serde_json::json!({"suspended": true, "includeJobs": true}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn activate_passes_the_execution_date() {
    let date: DateTime<Utc> = "2014-01-01T00:00:00Z".parse().unwrap();
    let mut mock = MockManagement::new();
    mock.expect_activate_job_definition()
        .with(eq("aJobDefId"), eq(false), eq(Some(date)))
        .times(1)
        .returning(|_, _, _| Ok(()));
    let mut services = support::engine_services();
    services.management = Arc::new(mock);
    let app = support::app_with(services);

    let resp = support::put_json(
        &app,
        "/job-definition/aJobDefId/suspended",
        serde_json::json!({"suspended": false, "executionDate": "2014-01-01T00:00:00Z"}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn malformed_execution_date_is_rejected() {
    let mut mock = MockManagement::new();
    mock.expect_suspend_job_definition().times(0);
    let mut services = support::engine_services();
    services.management = Arc::new(mock);
    let app = support::app_with(services);

    let resp = support::put_json(
        &app,
        "/job-definition/aJobDefId/suspended",
        serde_json::json!({"suspended": true, "executionDate": "notADate"}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = support::body_json(resp).await;
    assert_eq!(body["type"], "InvalidRequestException");
}

#[tokio::test]
async fn suspension_cascades_to_jobs_when_requested() {
    let (engine, app) = support::engine_app().await;
    engine.insert_job_definition(support::sample_job_definition()).await;
    engine.insert_job(support::sample_job()).await;

    let resp = support::put_json(
        &app,
        "/job-definition/aJobDefId/suspended",
        serde_json::json!({"suspended": true, "includeJobs": true}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let body = support::body_json(support::get(&app, "/job-definition/aJobDefId").await).await;
    assert_eq!(body["suspended"], true);
    let body = support::body_json(support::get(&app, "/job/aJobId").await).await;
    assert_eq!(body["suspended"], true);
}

#[tokio::test]
async fn retries_by_definition_apply_to_all_jobs() {
    let (engine, app) = support::engine_app().await;
    engine.insert_job_definition(support::sample_job_definition()).await;
    engine.insert_job(support::sample_job()).await;
    let mut second = support::sample_job();
    second.id = "anotherJobId".into();
    engine.insert_job(second).await;

    let resp = support::put_json(
        &app,
        "/job-definition/aJobDefId/retries",
        serde_json::json!({"retries": 0}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let body = support::body_json(support::get(&app, "/job?noRetriesLeft=true").await).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn negative_retries_by_definition_are_rejected() {
    let (_engine, app) = support::engine_app().await;
    let resp = support::put_json(
        &app,
        "/job-definition/aJobDefId/retries",
        serde_json::json!({"retries": -5}),
    )
    .await;
    support::assert_error(
        resp,
        StatusCode::BAD_REQUEST,
        "InvalidRequestException",
        "The number of job retries must be a non-negative Integer, but '-5' has been provided.",
    )
    .await;
}

#[tokio::test]
async fn missing_definition_is_a_not_found_envelope() {
    let (_engine, app) = support::engine_app().await;
    let resp = support::get(&app, "/job-definition/aNonExistingId").await;
    support::assert_error(
        resp,
        StatusCode::NOT_FOUND,
        "InvalidRequestException",
        "Job definition with id aNonExistingId does not exist.",
    )
    .await;
}

#[tokio::test]
async fn count_and_post_query() {
    let (engine, app) = support::engine_app().await;
    engine.insert_job_definition(support::sample_job_definition()).await;

    let body = support::body_json(support::get(&app, "/job-definition/count").await).await;
    assert_eq!(body["count"], 1);

    let resp = support::post_json(
        &app,
        "/job-definition",
        serde_json::json!({"activityIdIn": ["anActivityId"]}),
    )
    .await;
    let body = support::body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}
