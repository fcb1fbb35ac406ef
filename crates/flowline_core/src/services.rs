//! Engine service traits — the boundary the REST layer fronts.
//!
//! All traits are consumed as `Arc<dyn Trait>` so the same handlers work
//! against the in-memory engine or test doubles. Every method returns
//! `Result<_, EngineError>`; handlers propagate with `?` and never interpret
//! errors beyond the envelope mapping.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::*;
use crate::error::Result;
use crate::query::*;

// ── Task service ─────────────────────────────────────────────

#[async_trait]
pub trait TaskService: Send + Sync {
    async fn find_tasks(&self, query: TaskQuery, page: Pagination) -> Result<Vec<Task>>;
    async fn count_tasks(&self, query: TaskQuery) -> Result<u64>;
    async fn get_task(&self, id: &str) -> Result<Task>;
    async fn create_task(&self, new_task: NewTask) -> Result<Task>;
    async fn update_task(&self, id: &str, update: UpdateTask) -> Result<()>;
    async fn delete_task(&self, id: &str) -> Result<()>;

    /// Claim for `user_id`; fails when the task is already claimed by someone
    /// else. A `None` user clears the assignee, like the original's
    /// `claim(id, null)`.
    async fn claim(&self, id: &str, user_id: Option<&str>) -> Result<()>;
    /// Direct assignee manipulation; `None` unclaims.
    async fn set_assignee(&self, id: &str, user_id: Option<&str>) -> Result<()>;
    async fn complete(&self, id: &str, variables: HashMap<String, VariableValue>) -> Result<()>;
    async fn resolve(&self, id: &str, variables: HashMap<String, VariableValue>) -> Result<()>;
    async fn delegate(&self, id: &str, user_id: &str) -> Result<()>;

    async fn get_task_variables(&self, id: &str) -> Result<HashMap<String, VariableValue>>;
    async fn get_task_variable(&self, id: &str, name: &str) -> Result<VariableValue>;
    async fn put_task_variable(&self, id: &str, name: &str, value: VariableValue) -> Result<()>;
    async fn remove_task_variable(&self, id: &str, name: &str) -> Result<()>;
}

// ── Runtime service ──────────────────────────────────────────

#[async_trait]
pub trait RuntimeService: Send + Sync {
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
    async fn put_instance_variable(&self, id: &str, name: &str, value: VariableValue)
        -> Result<()>;
    async fn remove_instance_variable(&self, id: &str, name: &str) -> Result<()>;

    /// Correlate a message against waiting subscriptions. Correlates exactly
    /// one subscription unless `correlation.all` is set; no match is an engine
    /// error.
    async fn correlate_message(
        &self,
        correlation: MessageCorrelation,
    ) -> Result<Vec<MessageCorrelationResult>>;
}

// ── Case service ─────────────────────────────────────────────

#[async_trait]
pub trait CaseService: Send + Sync {
    async fn find_case_executions(
        &self,
        query: CaseExecutionQuery,
        page: Pagination,
    ) -> Result<Vec<CaseExecution>>;
    async fn count_case_executions(&self, query: CaseExecutionQuery) -> Result<u64>;
    async fn get_case_execution(&self, id: &str) -> Result<CaseExecution>;
}

// ── Management service (jobs, job definitions) ───────────────

#[async_trait]
pub trait ManagementService: Send + Sync {
    async fn find_jobs(&self, query: JobQuery, page: Pagination) -> Result<Vec<Job>>;
    async fn count_jobs(&self, query: JobQuery) -> Result<u64>;
    async fn get_job(&self, id: &str) -> Result<Job>;
    async fn delete_job(&self, id: &str) -> Result<()>;
    async fn set_job_retries(&self, id: &str, retries: u32) -> Result<()>;
    /// Run the job synchronously in the calling thread, like the original's
    /// `executeJob`. Execution failures surface as engine errors.
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
        execution_date: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<()>;
    async fn activate_job_definition(
        &self,
        id: &str,
        include_jobs: bool,
        execution_date: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<()>;
    async fn set_job_retries_by_definition(&self, id: &str, retries: u32) -> Result<()>;
}

// ── Incident service ─────────────────────────────────────────

#[async_trait]
pub trait IncidentService: Send + Sync {
    async fn find_incidents(&self, query: IncidentQuery, page: Pagination)
        -> Result<Vec<Incident>>;
    async fn count_incidents(&self, query: IncidentQuery) -> Result<u64>;
    async fn get_incident(&self, id: &str) -> Result<Incident>;
    async fn resolve_incident(&self, id: &str) -> Result<()>;
}

// ── Variable instances ───────────────────────────────────────

#[async_trait]
pub trait VariableInstanceService: Send + Sync {
    async fn find_variable_instances(
        &self,
        query: VariableInstanceQuery,
        page: Pagination,
    ) -> Result<Vec<VariableInstance>>;
    async fn count_variable_instances(&self, query: VariableInstanceQuery) -> Result<u64>;
}

// ── History service ──────────────────────────────────────────

#[async_trait]
pub trait HistoryService: Send + Sync {
    async fn find_historic_process_instances(
        &self,
        query: HistoricProcessInstanceQuery,
        page: Pagination,
    ) -> Result<Vec<HistoricProcessInstance>>;
    async fn count_historic_process_instances(
        &self,
        query: HistoricProcessInstanceQuery,
    ) -> Result<u64>;
    async fn get_historic_process_instance(&self, id: &str) -> Result<HistoricProcessInstance>;
    async fn delete_historic_process_instance(&self, id: &str) -> Result<()>;

    async fn find_historic_variable_instances(
        &self,
        query: HistoricVariableInstanceQuery,
        page: Pagination,
    ) -> Result<Vec<HistoricVariableInstance>>;
    async fn count_historic_variable_instances(
        &self,
        query: HistoricVariableInstanceQuery,
    ) -> Result<u64>;
}

// ── Identity service ─────────────────────────────────────────

#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn find_users(&self, query: UserQuery, page: Pagination) -> Result<Vec<User>>;
    async fn count_users(&self, query: UserQuery) -> Result<u64>;
    async fn get_user(&self, id: &str) -> Result<User>;
    async fn create_user(&self, new_user: NewUser) -> Result<()>;
    async fn delete_user(&self, id: &str) -> Result<()>;

    async fn find_groups(&self, query: GroupQuery, page: Pagination) -> Result<Vec<Group>>;
    async fn count_groups(&self, query: GroupQuery) -> Result<u64>;
    async fn get_group(&self, id: &str) -> Result<Group>;
}

// ── Authorization service ────────────────────────────────────

/// Permissions consulted when assembling OPTIONS discovery links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Read,
    Create,
    Update,
    Delete,
}

/// Resource kinds the authorization checks distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Task,
    Filter,
    User,
    Group,
}

#[async_trait]
pub trait AuthorizationService: Send + Sync {
    /// Whether `user_id` holds `permission` on `resource` (optionally scoped
    /// to one resource id). Anonymous callers pass `None` and are granted
    /// everything, matching an engine with authorization disabled.
    async fn is_user_authorized(
        &self,
        user_id: Option<&str>,
        permission: Permission,
        resource: Resource,
        resource_id: Option<&str>,
    ) -> Result<bool>;
}

// ── Filter service ───────────────────────────────────────────

#[async_trait]
pub trait FilterService: Send + Sync {
    async fn find_filters(&self, resource_type: Option<&str>, page: Pagination)
        -> Result<Vec<Filter>>;
    async fn count_filters(&self, resource_type: Option<&str>) -> Result<u64>;
    async fn get_filter(&self, id: &str) -> Result<Filter>;
    async fn create_filter(&self, new_filter: NewFilter) -> Result<Filter>;
    async fn update_filter(&self, id: &str, update: NewFilter) -> Result<()>;
    async fn delete_filter(&self, id: &str) -> Result<()>;

    /// Execute the stored query, optionally extended by an ad-hoc query whose
    /// set fields override the stored ones.
    async fn execute_list(
        &self,
        id: &str,
        extending: Option<TaskQuery>,
        page: Pagination,
    ) -> Result<Vec<Task>>;
    /// Like `execute_list` but expects at most one result; more than one is an
    /// engine error.
    async fn execute_single(&self, id: &str, extending: Option<TaskQuery>)
        -> Result<Option<Task>>;
    async fn execute_count(&self, id: &str, extending: Option<TaskQuery>) -> Result<u64>;
}
