//! HTTP contract of `GET|POST /task` and `/task/count`: parameter binding,
//! sorting validation and pagination.

mod support;

use std::sync::Arc;

use flowline_core::query::{
    Comparator, Pagination, SortOrder, Sorting, TaskQuery, TaskSortKey, VariableFilter,
};
use flowline_core::domain::VariableValue;
use hyper::StatusCode;
use support::RecordingTasks;

#[tokio::test]
async fn query_returns_seeded_tasks() {
    let (engine, app) = support::engine_app().await;
    engine.insert_task(support::sample_task()).await;

    let resp = support::get(&app, "/task").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = support::body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], "anId");
    assert_eq!(body[0]["name"], "aName");
    assert_eq!(body[0]["priority"], 42);
    assert_eq!(body[0]["created"], "2013-01-23T13:42:42Z");
    assert_eq!(body[0]["processInstanceId"], "aProcInstId");
}

#[tokio::test]
async fn query_binds_filter_parameters() {
    let spy = Arc::new(RecordingTasks::returning(vec![support::sample_task()]));
    let mut services = support::engine_services();
    services.tasks = spy.clone();
    let app = support::app_with(services);

    let resp = support::get(
        &app,
        "/task?name=aName&assignee=anAssignee&candidateGroups=groupA,groupB&priority=42&unassigned=false&active=true&dueDate=2013-01-23T13:49:42Z",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let query = spy.last_query();
    assert_eq!(query.name.as_deref(), Some("aName"));
    assert_eq!(query.assignee.as_deref(), Some("anAssignee"));
    assert_eq!(query.candidate_groups, vec!["groupA", "groupB"]);
    assert_eq!(query.priority, Some(42));
    assert!(!query.unassigned);
    assert!(query.active);
    assert_eq!(query.due_date, Some("2013-01-23T13:49:42Z".parse().unwrap()));
}

#[tokio::test]
async fn query_binds_variable_expressions() {
    let spy = Arc::new(RecordingTasks::default());
    let mut services = support::engine_services();
    services.tasks = spy.clone();
    let app = support::app_with(services);

    let resp = support::get(
        &app,
        "/task?taskVariables=amount_gteq_5&processVariables=name_like_%25Value",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let query = spy.last_query();
    assert_eq!(
        query.task_variables,
        vec![VariableFilter::new("amount", Comparator::Gteq, VariableValue::Integer(5))]
    );
    assert_eq!(
        query.process_variables,
        vec![VariableFilter::new(
            "name",
            Comparator::Like,
            VariableValue::String("%Value".into())
        )]
    );
}

#[tokio::test]
async fn sorting_requires_both_parameters() {
    let spy = Arc::new(RecordingTasks::default());
    let mut services = support::engine_services();
    services.tasks = spy.clone();
    let app = support::app_with(services);

    let resp = support::get(&app, "/task?sortBy=dueDate").await;
    support::assert_error(
        resp,
        StatusCode::BAD_REQUEST,
        "InvalidRequestException",
        "Only a single sorting parameter specified. sortBy and sortOrder required",
    )
    .await;
    // Validation fails before the service is consulted.
    assert!(spy.queries.lock().unwrap().is_empty());

    let resp = support::get(&app, "/task?sortOrder=asc").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_sort_key_is_rejected() {
    let (_engine, app) = support::engine_app().await;
    let resp = support::get(&app, "/task?sortBy=anInvalidKey&sortOrder=asc").await;
    support::assert_error(
        resp,
        StatusCode::BAD_REQUEST,
        "InvalidRequestException",
        "Cannot set query parameter 'sortBy' to value 'anInvalidKey'",
    )
    .await;
}

#[tokio::test]
async fn unknown_variable_comparator_is_rejected() {
    let (_engine, app) = support::engine_app().await;
    let resp = support::get(&app, "/task?taskVariables=x_anInvalidComparator_1").await;
    support::assert_error(
        resp,
        StatusCode::BAD_REQUEST,
        "InvalidRequestException",
        "Invalid variable comparator specified: anInvalidComparator",
    )
    .await;
}

#[tokio::test]
async fn invalid_delegation_state_is_rejected() {
    let (_engine, app) = support::engine_app().await;
    let resp = support::get(&app, "/task?delegationState=invalidState").await;
    support::assert_error(
        resp,
        StatusCode::BAD_REQUEST,
        "InvalidRequestException",
        "Cannot set query parameter 'delegationState' to value 'invalidState'",
    )
    .await;
}

#[tokio::test]
async fn pagination_parameters_are_forwarded() {
    let spy = Arc::new(RecordingTasks::default());
    let mut services = support::engine_services();
    services.tasks = spy.clone();
    let app = support::app_with(services);

    support::get(&app, "/task?firstResult=2&maxResults=10").await;
    assert_eq!(spy.pages.lock().unwrap()[0], Pagination::window(2, 10));

    support::get(&app, "/task").await;
    assert_eq!(spy.pages.lock().unwrap()[1], Pagination::default());
}

#[tokio::test]
async fn non_numeric_pagination_is_rejected() {
    let (_engine, app) = support::engine_app().await;
    let resp = support::get(&app, "/task?firstResult=aString").await;
    support::assert_error(
        resp,
        StatusCode::BAD_REQUEST,
        "InvalidRequestException",
        "Cannot set query parameter 'firstResult' to value 'aString'",
    )
    .await;
}

#[tokio::test]
async fn post_query_binds_body_and_query_string_pagination() {
    let spy = Arc::new(RecordingTasks::default());
    let mut services = support::engine_services();
    services.tasks = spy.clone();
    let app = support::app_with(services);

    let resp = support::post_json(
        &app,
        "/task?firstResult=1&maxResults=5",
        serde_json::json!({
            "name": "aName",
            "sorting": [
                {"sortBy": "dueDate", "sortOrder": "asc"},
                {"sortBy": "priority", "sortOrder": "desc"}
            ]
        }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let query = spy.last_query();
    assert_eq!(query.name.as_deref(), Some("aName"));
    assert_eq!(
        query.sorting,
        vec![
            Sorting::new(TaskSortKey::DueDate, SortOrder::Asc),
            Sorting::new(TaskSortKey::Priority, SortOrder::Desc),
        ]
    );
    assert_eq!(spy.pages.lock().unwrap()[0], Pagination::window(1, 5));
}

#[tokio::test]
async fn post_query_with_invalid_sort_key_is_rejected() {
    let (_engine, app) = support::engine_app().await;
    let resp = support::post_json(
        &app,
        "/task",
        serde_json::json!({"sorting": [{"sortBy": "anInvalidKey", "sortOrder": "asc"}]}),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = support::body_json(resp).await;
    assert_eq!(body["type"], "InvalidRequestException");
}

#[tokio::test]
async fn count_returns_envelope() {
    let spy = Arc::new(RecordingTasks::returning(vec![support::sample_task()]));
    let mut services = support::engine_services();
    services.tasks = spy.clone();
    let app = support::app_with(services);

    let resp = support::get(&app, "/task/count?assignee=anAssignee").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(support::body_json(resp).await, serde_json::json!({"count": 1}));
    assert_eq!(
        spy.count_queries.lock().unwrap()[0].assignee.as_deref(),
        Some("anAssignee")
    );

    let resp = support::post_json(&app, "/task/count", serde_json::json!({"name": "aName"})).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(support::body_json(resp).await["count"], 1);
}

#[tokio::test]
async fn sorting_and_pagination_apply_end_to_end() {
    let (engine, app) = support::engine_app().await;
    for (id, priority) in [("t1", 30), ("t2", 10), ("t3", 20)] {
        let mut task = support::sample_task();
        task.id = id.into();
        task.priority = priority;
        engine.insert_task(task).await;
    }

    let resp = support::get(
        &app,
        "/task?sortBy=priority&sortOrder=asc&firstResult=1&maxResults=1",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = support::body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], "t3");
}

#[tokio::test]
async fn involved_user_filters_tasks() {
    let (engine, app) = support::engine_app().await;
    engine.insert_task(support::sample_task()).await;
    engine
        .set_candidate_users("anId", vec!["aCandidate".into()])
        .await;

    let resp = support::get(&app, "/task?involvedUser=aCompletelyUnrelatedUser").await;
    assert!(support::body_json(resp).await.as_array().unwrap().is_empty());

    for user in ["anAssignee", "anOwner", "aCandidate"] {
        let resp = support::get(&app, &format!("/task?involvedUser={user}")).await;
        let body = support::body_json(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 1, "expected a match for {user}");
    }
}

#[tokio::test]
async fn default_task_query_matches_the_full_shape() {
    // Guards against new query fields silently defaulting differently on the
    // GET and POST paths.
    let spy = Arc::new(RecordingTasks::default());
    let mut services = support::engine_services();
    services.tasks = spy.clone();
    let app = support::app_with(services);

    support::get(&app, "/task").await;
    assert_eq!(spy.last_query(), TaskQuery::default());
}
