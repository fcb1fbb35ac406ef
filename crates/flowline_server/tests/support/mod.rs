//! Shared fixtures and helpers for the HTTP contract tests.
//!
//! Tests run the real router over either the in-memory engine (behavior
//! tests) or spy/mock services (invocation tests), driven through
//! `tower::ServiceExt::oneshot` — no sockets involved.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::Router;
use flowline_core::domain::{
    CaseExecution, Group, HistoricProcessInstance, HistoricProcessInstanceState, Incident, Job,
    JobDefinition, MessageCorrelationResult, NewTask, ProcessInstance, Task, UpdateTask, User,
    VariableValue,
};
use chrono::{DateTime, Utc};
use flowline_core::memory::{MemoryEngine, MessageSubscription};
use flowline_core::query::{
    JobDefinitionQuery, JobQuery, MessageCorrelation, Pagination, ProcessInstanceQuery, TaskQuery,
};
use flowline_core::services::{ManagementService, RuntimeService, TaskService};
use flowline_core::Result;
use http_body_util::BodyExt;
use hyper::{Request, StatusCode};
use tower::ServiceExt;

use flowline_server::router::{build_router, router_with_engine, EngineServices};

// ── Fixture constants ──────────────────────────────────────────

pub const EXAMPLE_TASK_ID: &str = "anId";
pub const EXAMPLE_TASK_NAME: &str = "aName";
pub const EXAMPLE_TASK_ASSIGNEE: &str = "anAssignee";
pub const EXAMPLE_TASK_OWNER: &str = "anOwner";
pub const EXAMPLE_TASK_PRIORITY: i32 = 42;
pub const EXAMPLE_TASK_CREATED: &str = "2013-01-23T13:42:42Z";
pub const EXAMPLE_TASK_DUE: &str = "2013-01-23T13:49:42Z";
pub const EXAMPLE_PROCESS_INSTANCE_ID: &str = "aProcInstId";
pub const EXAMPLE_PROCESS_DEFINITION_ID: &str = "aProcDefId";
pub const EXAMPLE_BUSINESS_KEY: &str = "aKey";
pub const EXAMPLE_EXECUTION_ID: &str = "anExecution";
pub const EXAMPLE_JOB_ID: &str = "aJobId";
pub const EXAMPLE_JOB_DEFINITION_ID: &str = "aJobDefId";
pub const EXAMPLE_INCIDENT_ID: &str = "anIncidentId";
pub const EXAMPLE_CASE_EXECUTION_ID: &str = "aCaseExecutionId";
pub const EXAMPLE_USER_ID: &str = "jonny1";
pub const EXAMPLE_GROUP_ID: &str = "groupId1";
pub const EXAMPLE_MESSAGE_NAME: &str = "aMessage";

// ── Fixture builders ───────────────────────────────────────────

pub fn sample_task() -> Task {
    Task {
        id: EXAMPLE_TASK_ID.into(),
        name: Some(EXAMPLE_TASK_NAME.into()),
        assignee: Some(EXAMPLE_TASK_ASSIGNEE.into()),
        owner: Some(EXAMPLE_TASK_OWNER.into()),
        created: EXAMPLE_TASK_CREATED.parse().unwrap(),
        due: Some(EXAMPLE_TASK_DUE.parse().unwrap()),
        follow_up: None,
        delegation_state: None,
        description: Some("aDescription".into()),
        execution_id: Some(EXAMPLE_EXECUTION_ID.into()),
        parent_task_id: None,
        priority: EXAMPLE_TASK_PRIORITY,
        process_definition_id: Some(EXAMPLE_PROCESS_DEFINITION_ID.into()),
        process_instance_id: Some(EXAMPLE_PROCESS_INSTANCE_ID.into()),
        case_definition_id: None,
        case_instance_id: None,
        case_execution_id: None,
        task_definition_key: Some("aTaskDefinitionKey".into()),
        suspended: false,
        tenant_id: None,
    }
}

pub fn sample_process_instance() -> ProcessInstance {
    ProcessInstance {
        id: EXAMPLE_PROCESS_INSTANCE_ID.into(),
        definition_id: EXAMPLE_PROCESS_DEFINITION_ID.into(),
        business_key: Some(EXAMPLE_BUSINESS_KEY.into()),
        case_instance_id: None,
        ended: false,
        suspended: false,
        tenant_id: None,
    }
}

pub fn sample_job() -> Job {
    Job {
        id: EXAMPLE_JOB_ID.into(),
        job_definition_id: Some(EXAMPLE_JOB_DEFINITION_ID.into()),
        process_instance_id: Some(EXAMPLE_PROCESS_INSTANCE_ID.into()),
        process_definition_id: Some(EXAMPLE_PROCESS_DEFINITION_ID.into()),
        process_definition_key: Some("aProcDefKey".into()),
        execution_id: Some(EXAMPLE_EXECUTION_ID.into()),
        exception_message: None,
        retries: 3,
        due_date: Some("2013-01-23T13:42:42Z".parse().unwrap()),
        suspended: false,
        priority: 10,
        tenant_id: None,
    }
}

pub fn sample_job_definition() -> JobDefinition {
    JobDefinition {
        id: EXAMPLE_JOB_DEFINITION_ID.into(),
        process_definition_id: EXAMPLE_PROCESS_DEFINITION_ID.into(),
        process_definition_key: "aProcDefKey".into(),
        activity_id: "anActivityId".into(),
        job_type: "aJobType".into(),
        job_configuration: Some("aJobConfig".into()),
        suspended: false,
        overriding_job_priority: None,
        tenant_id: None,
    }
}

pub fn sample_incident() -> Incident {
    Incident {
        id: EXAMPLE_INCIDENT_ID.into(),
        process_definition_id: Some(EXAMPLE_PROCESS_DEFINITION_ID.into()),
        process_instance_id: Some(EXAMPLE_PROCESS_INSTANCE_ID.into()),
        execution_id: Some(EXAMPLE_EXECUTION_ID.into()),
        incident_timestamp: "2014-01-01T00:00:00Z".parse().unwrap(),
        incident_type: "failedJob".into(),
        activity_id: Some("anActivityId".into()),
        cause_incident_id: None,
        root_cause_incident_id: None,
        configuration: Some(EXAMPLE_JOB_ID.into()),
        incident_message: Some("anIncidentMessage".into()),
        job_definition_id: Some(EXAMPLE_JOB_DEFINITION_ID.into()),
        tenant_id: None,
    }
}

pub fn sample_case_execution() -> CaseExecution {
    CaseExecution {
        id: EXAMPLE_CASE_EXECUTION_ID.into(),
        case_instance_id: "aCaseInstId".into(),
        case_definition_id: "aCaseDefId".into(),
        activity_id: Some("anActivityId".into()),
        activity_name: Some("anActivityName".into()),
        activity_type: Some("humanTask".into()),
        parent_id: None,
        active: true,
        enabled: false,
        disabled: false,
        required: false,
        tenant_id: None,
    }
}

pub fn sample_historic_process_instance() -> HistoricProcessInstance {
    HistoricProcessInstance {
        id: EXAMPLE_PROCESS_INSTANCE_ID.into(),
        business_key: Some(EXAMPLE_BUSINESS_KEY.into()),
        process_definition_id: EXAMPLE_PROCESS_DEFINITION_ID.into(),
        process_definition_key: "aProcDefKey".into(),
        start_time: "2013-01-23T13:42:42Z".parse().unwrap(),
        end_time: Some("2013-01-23T14:42:42Z".parse().unwrap()),
        duration_in_millis: Some(3_600_000),
        start_user_id: Some(EXAMPLE_USER_ID.into()),
        start_activity_id: Some("startEvent".into()),
        delete_reason: None,
        state: HistoricProcessInstanceState::Completed,
        tenant_id: None,
    }
}

pub fn sample_user() -> User {
    User {
        id: EXAMPLE_USER_ID.into(),
        first_name: Some("John".into()),
        last_name: Some("Doe".into()),
        email: Some("john.doe@example.org".into()),
    }
}

pub fn sample_group() -> Group {
    Group {
        id: EXAMPLE_GROUP_ID.into(),
        name: Some("group1".into()),
        group_type: Some("organizational-unit".into()),
    }
}

pub fn sample_subscription() -> MessageSubscription {
    MessageSubscription {
        execution_id: EXAMPLE_EXECUTION_ID.into(),
        process_instance_id: EXAMPLE_PROCESS_INSTANCE_ID.into(),
        message_name: EXAMPLE_MESSAGE_NAME.into(),
    }
}

// ── App builders ───────────────────────────────────────────────

/// Router plus the engine behind it, so tests can seed and inspect state.
pub async fn engine_app() -> (Arc<MemoryEngine>, Router) {
    let engine = Arc::new(MemoryEngine::new());
    let app = router_with_engine(engine.clone());
    (engine, app)
}

/// Services all backed by a fresh engine; tests swap individual fields for
/// spies or mocks.
pub fn engine_services() -> EngineServices {
    EngineServices::from_engine(Arc::new(MemoryEngine::new()))
}

pub fn app_with(services: EngineServices) -> Router {
    build_router(services)
}

// ── Request helpers ────────────────────────────────────────────

pub async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn request_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> axum::response::Response {
    request_json(app, "POST", uri, body).await
}

pub async fn put_json(app: &Router, uri: &str, body: serde_json::Value) -> axum::response::Response {
    request_json(app, "PUT", uri, body).await
}

pub async fn post_empty(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn delete(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn options(app: &Router, uri: &str, user: Option<&str>) -> axum::response::Response {
    let mut builder = Request::builder().method("OPTIONS").uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-authenticated-user", user);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        serde_json::json!({ "raw": String::from_utf8_lossy(&bytes).to_string() })
    })
}

/// Asserts the `{"type", "message"}` envelope.
pub async fn assert_error(
    resp: axum::response::Response,
    status: StatusCode,
    error_type: &str,
    message: &str,
) {
    assert_eq!(resp.status(), status);
    let body = body_json(resp).await;
    assert_eq!(body["type"], error_type, "unexpected envelope: {body}");
    assert_eq!(body["message"], message, "unexpected envelope: {body}");
}

// ── Task service spy ───────────────────────────────────────────

/// Records every call so tests can assert exactly which query the handlers
/// built. Mutating operations succeed and are logged; lookups return the
/// configured results.
#[derive(Default)]
pub struct RecordingTasks {
    pub results: Mutex<Vec<Task>>,
    pub queries: Mutex<Vec<TaskQuery>>,
    pub pages: Mutex<Vec<Pagination>>,
    pub count_queries: Mutex<Vec<TaskQuery>>,
    pub claims: Mutex<Vec<(String, Option<String>)>>,
    pub assignments: Mutex<Vec<(String, Option<String>)>>,
    pub completions: Mutex<Vec<(String, HashMap<String, VariableValue>)>>,
    pub resolutions: Mutex<Vec<(String, HashMap<String, VariableValue>)>>,
    pub delegations: Mutex<Vec<(String, String)>>,
}

impl RecordingTasks {
    pub fn returning(results: Vec<Task>) -> Self {
        Self {
            results: Mutex::new(results),
            ..Self::default()
        }
    }

    pub fn last_query(&self) -> TaskQuery {
        self.queries.lock().unwrap().last().cloned().expect("no query recorded")
    }
}

#[async_trait]
impl TaskService for RecordingTasks {
    async fn find_tasks(&self, query: TaskQuery, page: Pagination) -> Result<Vec<Task>> {
        self.queries.lock().unwrap().push(query);
        self.pages.lock().unwrap().push(page);
        Ok(self.results.lock().unwrap().clone())
    }

    async fn count_tasks(&self, query: TaskQuery) -> Result<u64> {
        let count = self.results.lock().unwrap().len() as u64;
        self.count_queries.lock().unwrap().push(query);
        Ok(count)
    }

    async fn get_task(&self, id: &str) -> Result<Task> {
        self.results
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| flowline_core::EngineError::not_found("Task", id))
    }

    async fn create_task(&self, new_task: NewTask) -> Result<Task> {
        let mut task = sample_task();
        if let Some(id) = new_task.id {
            task.id = id;
        }
        Ok(task)
    }

    async fn update_task(&self, _id: &str, _update: UpdateTask) -> Result<()> {
        Ok(())
    }

    async fn delete_task(&self, _id: &str) -> Result<()> {
        Ok(())
    }

    async fn claim(&self, id: &str, user_id: Option<&str>) -> Result<()> {
        self.claims
            .lock()
            .unwrap()
            .push((id.to_string(), user_id.map(str::to_string)));
        Ok(())
    }

    async fn set_assignee(&self, id: &str, user_id: Option<&str>) -> Result<()> {
        self.assignments
            .lock()
            .unwrap()
            .push((id.to_string(), user_id.map(str::to_string)));
        Ok(())
    }

    async fn complete(&self, id: &str, variables: HashMap<String, VariableValue>) -> Result<()> {
        self.completions.lock().unwrap().push((id.to_string(), variables));
        Ok(())
    }

    async fn resolve(&self, id: &str, variables: HashMap<String, VariableValue>) -> Result<()> {
        self.resolutions.lock().unwrap().push((id.to_string(), variables));
        Ok(())
    }

    async fn delegate(&self, id: &str, user_id: &str) -> Result<()> {
        self.delegations
            .lock()
            .unwrap()
            .push((id.to_string(), user_id.to_string()));
        Ok(())
    }

    async fn get_task_variables(&self, _id: &str) -> Result<HashMap<String, VariableValue>> {
        Ok(HashMap::new())
    }

    async fn get_task_variable(&self, id: &str, name: &str) -> Result<VariableValue> {
        let _ = id;
        Err(flowline_core::EngineError::not_found("task variable", name))
    }

    async fn put_task_variable(&self, _id: &str, _name: &str, _value: VariableValue) -> Result<()> {
        Ok(())
    }

    async fn remove_task_variable(&self, _id: &str, _name: &str) -> Result<()> {
        Ok(())
    }
}

// ── Mock services ──────────────────────────────────────────────

mockall::mock! {
    pub Management {}

    #[async_trait]
    impl ManagementService for Management {
        async fn find_jobs(&self, query: JobQuery, page: Pagination) -> Result<Vec<Job>>;
        async fn count_jobs(&self, query: JobQuery) -> Result<u64>;
        async fn get_job(&self, id: &str) -> Result<Job>;
        async fn delete_job(&self, id: &str) -> Result<()>;
        async fn set_job_retries(&self, id: &str, retries: u32) -> Result<()>;
        async fn execute_job(&self, id: &str) -> Result<()>;
        async fn set_job_suspension(&self, id: &str, suspended: bool) -> Result<()>;
        async fn find_job_definitions(
            &self,
            query: JobDefinitionQuery,
            page: Pagination,
        ) -> Result<Vec<JobDefinition>>;
        async fn count_job_definitions(&self, query: JobDefinitionQuery) -> Result<u64>;
        async fn get_job_definition(&self, id: &str) -> Result<JobDefinition>;
        async fn suspend_job_definition(
            &self,
            id: &str,
            include_jobs: bool,
            execution_date: Option<DateTime<Utc>>,
        ) -> Result<()>;
        async fn activate_job_definition(
            &self,
            id: &str,
            include_jobs: bool,
            execution_date: Option<DateTime<Utc>>,
        ) -> Result<()>;
        async fn set_job_retries_by_definition(&self, id: &str, retries: u32) -> Result<()>;
    }
}

mockall::mock! {
    pub Runtime {}

    #[async_trait]
    impl RuntimeService for Runtime {
        async fn find_process_instances(
            &self,
            query: ProcessInstanceQuery,
            page: Pagination,
        ) -> Result<Vec<ProcessInstance>>;
        async fn count_process_instances(&self, query: ProcessInstanceQuery) -> Result<u64>;
        async fn get_process_instance(&self, id: &str) -> Result<ProcessInstance>;
        async fn delete_process_instance(&self, id: &str) -> Result<()>;
        async fn set_process_instance_suspension(&self, id: &str, suspended: bool) -> Result<()>;
        async fn get_instance_variables(&self, id: &str) -> Result<HashMap<String, VariableValue>>;
        async fn get_instance_variable(&self, id: &str, name: &str) -> Result<VariableValue>;
        async fn put_instance_variable(
            &self,
            id: &str,
            name: &str,
            value: VariableValue,
        ) -> Result<()>;
        async fn remove_instance_variable(&self, id: &str, name: &str) -> Result<()>;
        async fn correlate_message(
            &self,
            correlation: MessageCorrelation,
        ) -> Result<Vec<MessageCorrelationResult>>;
    }
}
