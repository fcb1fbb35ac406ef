//! In-memory engine — reference implementation of every service trait.
//!
//! Backs the standalone binary and the end-to-end tests. This is a store with
//! query semantics, not an execution engine: nothing here schedules jobs or
//! advances process state on its own.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::variables::like_match;
use crate::domain::*;
use crate::error::{EngineError, Result};
use crate::query::*;
use crate::services::*;

/// A message subscription a correlation can match.
#[derive(Debug, Clone)]
pub struct MessageSubscription {
    pub execution_id: String,
    pub process_instance_id: String,
    pub message_name: String,
}

#[derive(Debug, Clone)]
struct Grant {
    user_id: String,
    permission: Permission,
    resource: Resource,
    resource_id: Option<String>,
}

#[derive(Default)]
struct State {
    tasks: HashMap<String, Task>,
    task_variables: HashMap<String, HashMap<String, VariableValue>>,
    task_candidate_groups: HashMap<String, Vec<String>>,
    task_candidate_users: HashMap<String, Vec<String>>,
    process_instances: HashMap<String, ProcessInstance>,
    instance_variables: HashMap<String, HashMap<String, VariableValue>>,
    // sub instance id -> super instance id
    instance_parents: HashMap<String, String>,
    case_executions: HashMap<String, CaseExecution>,
    case_execution_variables: HashMap<String, HashMap<String, VariableValue>>,
    jobs: HashMap<String, Job>,
    job_definitions: HashMap<String, JobDefinition>,
    incidents: HashMap<String, Incident>,
    historic_process_instances: HashMap<String, HistoricProcessInstance>,
    historic_variables: HashMap<String, HistoricVariableInstance>,
    users: HashMap<String, User>,
    groups: HashMap<String, Group>,
    group_members: HashMap<String, Vec<String>>,
    filters: HashMap<String, Filter>,
    subscriptions: Vec<MessageSubscription>,
    grants: Vec<Grant>,
    authorization_enabled: bool,
}

pub struct MemoryEngine {
    state: RwLock<State>,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }

    // ── Seeding ──────────────────────────────────────────────

    pub async fn insert_task(&self, task: Task) {
        self.state.write().await.tasks.insert(task.id.clone(), task);
    }

    pub async fn set_candidate_groups(&self, task_id: &str, groups: Vec<String>) {
        self.state
            .write()
            .await
            .task_candidate_groups
            .insert(task_id.to_string(), groups);
    }

    pub async fn set_candidate_users(&self, task_id: &str, users: Vec<String>) {
        self.state
            .write()
            .await
            .task_candidate_users
            .insert(task_id.to_string(), users);
    }

    pub async fn insert_process_instance(
        &self,
        instance: ProcessInstance,
        variables: HashMap<String, VariableValue>,
    ) {
        let mut state = self.state.write().await;
        state
            .instance_variables
            .insert(instance.id.clone(), variables);
        state
            .process_instances
            .insert(instance.id.clone(), instance);
    }

    pub async fn link_sub_process_instance(&self, super_id: &str, sub_id: &str) {
        self.state
            .write()
            .await
            .instance_parents
            .insert(sub_id.to_string(), super_id.to_string());
    }

    pub async fn insert_case_execution(&self, execution: CaseExecution) {
        self.state
            .write()
            .await
            .case_executions
            .insert(execution.id.clone(), execution);
    }

    pub async fn set_case_execution_variables(
        &self,
        execution_id: &str,
        variables: HashMap<String, VariableValue>,
    ) {
        self.state
            .write()
            .await
            .case_execution_variables
            .insert(execution_id.to_string(), variables);
    }

    pub async fn insert_job(&self, job: Job) {
        self.state.write().await.jobs.insert(job.id.clone(), job);
    }

    pub async fn insert_job_definition(&self, definition: JobDefinition) {
        self.state
            .write()
            .await
            .job_definitions
            .insert(definition.id.clone(), definition);
    }

    pub async fn insert_incident(&self, incident: Incident) {
        self.state
            .write()
            .await
            .incidents
            .insert(incident.id.clone(), incident);
    }

    pub async fn insert_historic_process_instance(&self, instance: HistoricProcessInstance) {
        self.state
            .write()
            .await
            .historic_process_instances
            .insert(instance.id.clone(), instance);
    }

    pub async fn insert_historic_variable(&self, variable: HistoricVariableInstance) {
        self.state
            .write()
            .await
            .historic_variables
            .insert(variable.id.clone(), variable);
    }

    pub async fn insert_user(&self, user: User) {
        self.state.write().await.users.insert(user.id.clone(), user);
    }

    pub async fn insert_group(&self, group: Group, members: Vec<String>) {
        let mut state = self.state.write().await;
        state.group_members.insert(group.id.clone(), members);
        state.groups.insert(group.id.clone(), group);
    }

    pub async fn subscribe(&self, subscription: MessageSubscription) {
        self.state.write().await.subscriptions.push(subscription);
    }

    pub async fn enable_authorization(&self) {
        self.state.write().await.authorization_enabled = true;
    }

    pub async fn grant(
        &self,
        user_id: &str,
        permission: Permission,
        resource: Resource,
        resource_id: Option<&str>,
    ) {
        self.state.write().await.grants.push(Grant {
            user_id: user_id.to_string(),
            permission,
            resource,
            resource_id: resource_id.map(str::to_string),
        });
    }
}

// ── Filter helpers ───────────────────────────────────────────

fn opt_eq(filter: &Option<String>, actual: Option<&str>) -> bool {
    filter.as_deref().is_none_or(|f| actual == Some(f))
}

fn opt_like(filter: &Option<String>, actual: Option<&str>) -> bool {
    filter
        .as_deref()
        .is_none_or(|pattern| actual.is_some_and(|a| like_match(a, pattern)))
}

fn in_list(filter: &[String], actual: Option<&str>) -> bool {
    filter.is_empty() || actual.is_some_and(|a| filter.iter().any(|f| f == a))
}

fn any_in_list(filter: &[String], actual: &[String]) -> bool {
    filter.is_empty() || actual.iter().any(|a| filter.contains(a))
}

fn before(limit: &Option<DateTime<Utc>>, actual: Option<DateTime<Utc>>) -> bool {
    limit.is_none_or(|l| actual.is_some_and(|a| a < l))
}

fn after(limit: &Option<DateTime<Utc>>, actual: Option<DateTime<Utc>>) -> bool {
    limit.is_none_or(|l| actual.is_some_and(|a| a > l))
}

fn variables_match(filters: &[VariableFilter], scope: Option<&HashMap<String, VariableValue>>) -> bool {
    filters.iter().all(|f| {
        scope
            .and_then(|vars| vars.get(&f.name))
            .is_some_and(|actual| f.matches(actual))
    })
}

fn apply_sort<T, K: Copy>(
    items: &mut [T],
    sorting: &[Sorting<K>],
    cmp: impl Fn(&T, &T, K) -> Ordering,
) {
    items.sort_by(|a, b| {
        for s in sorting {
            let ord = match s.sort_order {
                SortOrder::Asc => cmp(a, b, s.sort_by),
                SortOrder::Desc => cmp(a, b, s.sort_by).reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

/// Overlay the set fields of `extending` onto `stored` — the filter-execution
/// extension semantics. Null, empty-list and false fields of the extending
/// query keep the stored value.
fn extend_task_query(stored: &TaskQuery, extending: TaskQuery) -> TaskQuery {
    let serde_json::Value::Object(mut base) =
        serde_json::to_value(stored).unwrap_or_default()
    else {
        return extending;
    };
    if let serde_json::Value::Object(overlay) = serde_json::to_value(&extending).unwrap_or_default()
    {
        for (key, value) in overlay {
            let keep_stored = value.is_null()
                || value.as_array().is_some_and(Vec::is_empty)
                || value.as_bool() == Some(false);
            if !keep_stored {
                base.insert(key, value);
            }
        }
    }
    serde_json::from_value(serde_json::Value::Object(base)).unwrap_or(extending)
}

impl State {
    fn task_matches(&self, task: &Task, q: &TaskQuery) -> bool {
        let task_vars = self.task_variables.get(&task.id);
        let proc_vars = task
            .process_instance_id
            .as_ref()
            .and_then(|id| self.instance_variables.get(id));
        let business_key = task
            .process_instance_id
            .as_ref()
            .and_then(|id| self.process_instances.get(id))
            .and_then(|pi| pi.business_key.as_deref());
        let candidate_groups = self
            .task_candidate_groups
            .get(&task.id)
            .cloned()
            .unwrap_or_default();
        let candidate_users = self
            .task_candidate_users
            .get(&task.id)
            .cloned()
            .unwrap_or_default();

        opt_eq(&q.process_instance_id, task.process_instance_id.as_deref())
            && opt_eq(&q.process_instance_business_key, business_key)
            && opt_like(&q.process_instance_business_key_like, business_key)
            && opt_eq(&q.process_definition_id, task.process_definition_id.as_deref())
            && opt_eq(&q.execution_id, task.execution_id.as_deref())
            && opt_eq(&q.case_instance_id, task.case_instance_id.as_deref())
            && opt_eq(&q.case_execution_id, task.case_execution_id.as_deref())
            && opt_eq(&q.name, task.name.as_deref())
            && opt_like(&q.name_like, task.name.as_deref())
            && opt_eq(&q.description, task.description.as_deref())
            && opt_like(&q.description_like, task.description.as_deref())
            && opt_eq(&q.assignee, task.assignee.as_deref())
            && opt_like(&q.assignee_like, task.assignee.as_deref())
            && opt_eq(&q.owner, task.owner.as_deref())
            && q.candidate_group
                .as_ref()
                .is_none_or(|g| candidate_groups.contains(g))
            && any_in_list(&q.candidate_groups, &candidate_groups)
            && q.candidate_user
                .as_ref()
                .is_none_or(|u| candidate_users.contains(u))
            && q.involved_user.as_deref().is_none_or(|u| {
                task.assignee.as_deref() == Some(u)
                    || task.owner.as_deref() == Some(u)
                    || candidate_users.iter().any(|c| c == u)
            })
            && q.priority.is_none_or(|p| task.priority == p)
            && q.min_priority.is_none_or(|p| task.priority >= p)
            && q.max_priority.is_none_or(|p| task.priority <= p)
            && q.due_date.is_none_or(|d| task.due == Some(d))
            && before(&q.due_before, task.due)
            && after(&q.due_after, task.due)
            && before(&q.created_before, Some(task.created))
            && after(&q.created_after, Some(task.created))
            && q.delegation_state
                .is_none_or(|s| task.delegation_state == Some(s))
            && opt_eq(&q.task_definition_key, task.task_definition_key.as_deref())
            && opt_like(&q.task_definition_key_like, task.task_definition_key.as_deref())
            && (!q.unassigned || task.assignee.is_none())
            && (!q.active || !task.suspended)
            && (!q.suspended || task.suspended)
            && in_list(&q.tenant_id_in, task.tenant_id.as_deref())
            && variables_match(&q.task_variables, task_vars)
            && variables_match(&q.process_variables, proc_vars)
    }

    fn query_tasks(&self, q: &TaskQuery) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .values()
            .filter(|t| self.task_matches(t, q))
            .cloned()
            .collect();
        apply_sort(&mut tasks, &q.sorting, |a, b, key| match key {
            TaskSortKey::Id => a.id.cmp(&b.id),
            TaskSortKey::Name => a.name.cmp(&b.name),
            TaskSortKey::NameCaseInsensitive => a
                .name
                .as_deref()
                .map(str::to_lowercase)
                .cmp(&b.name.as_deref().map(str::to_lowercase)),
            TaskSortKey::Assignee => a.assignee.cmp(&b.assignee),
            TaskSortKey::Created => a.created.cmp(&b.created),
            TaskSortKey::Description => a.description.cmp(&b.description),
            TaskSortKey::DueDate => a.due.cmp(&b.due),
            TaskSortKey::FollowUpDate => a.follow_up.cmp(&b.follow_up),
            TaskSortKey::Priority => a.priority.cmp(&b.priority),
            TaskSortKey::InstanceId => a.process_instance_id.cmp(&b.process_instance_id),
            TaskSortKey::ExecutionId => a.execution_id.cmp(&b.execution_id),
            TaskSortKey::CaseInstanceId => a.case_instance_id.cmp(&b.case_instance_id),
            TaskSortKey::CaseExecutionId => a.case_execution_id.cmp(&b.case_execution_id),
            TaskSortKey::TenantId => a.tenant_id.cmp(&b.tenant_id),
        });
        tasks
    }

    fn instance_matches(&self, pi: &ProcessInstance, q: &ProcessInstanceQuery) -> bool {
        let vars = self.instance_variables.get(&pi.id);
        let incident_match = q.incident_id.is_none() && q.incident_type.is_none()
            || self.incidents.values().any(|i| {
                i.process_instance_id.as_deref() == Some(&pi.id)
                    && q.incident_id.as_deref().is_none_or(|id| i.id == id)
                    && q.incident_type
                        .as_deref()
                        .is_none_or(|t| i.incident_type == t)
            });

        in_list(&q.process_instance_ids, Some(&pi.id))
            && opt_eq(&q.business_key, pi.business_key.as_deref())
            && opt_like(&q.business_key_like, pi.business_key.as_deref())
            && opt_eq(&q.case_instance_id, pi.case_instance_id.as_deref())
            && q.process_definition_id
                .as_deref()
                .is_none_or(|d| pi.definition_id == d)
            && q.process_definition_key
                .as_deref()
                .is_none_or(|k| pi.definition_id.starts_with(&format!("{k}:")))
            && (!q.active || !pi.suspended)
            && (!q.suspended || pi.suspended)
            && q.super_process_instance
                .as_deref()
                .is_none_or(|s| self.instance_parents.get(&pi.id).is_some_and(|p| p == s))
            && q.sub_process_instance
                .as_deref()
                .is_none_or(|s| self.instance_parents.get(s).is_some_and(|p| p == &pi.id))
            && incident_match
            && in_list(&q.tenant_id_in, pi.tenant_id.as_deref())
            && variables_match(&q.variables, vars)
    }

    fn query_process_instances(&self, q: &ProcessInstanceQuery) -> Vec<ProcessInstance> {
        let mut instances: Vec<ProcessInstance> = self
            .process_instances
            .values()
            .filter(|pi| self.instance_matches(pi, q))
            .cloned()
            .collect();
        apply_sort(&mut instances, &q.sorting, |a, b, key| match key {
            ProcessInstanceSortKey::InstanceId => a.id.cmp(&b.id),
            ProcessInstanceSortKey::DefinitionId => a.definition_id.cmp(&b.definition_id),
            ProcessInstanceSortKey::DefinitionKey => definition_key(&a.definition_id)
                .cmp(definition_key(&b.definition_id)),
            ProcessInstanceSortKey::BusinessKey => a.business_key.cmp(&b.business_key),
            ProcessInstanceSortKey::TenantId => a.tenant_id.cmp(&b.tenant_id),
        });
        instances
    }

    fn case_execution_matches(&self, ce: &CaseExecution, q: &CaseExecutionQuery) -> bool {
        let case_vars = self.instance_variables.get(&ce.case_instance_id);
        // case instances share the instance store
        let business_key = self
            .process_instances
            .get(&ce.case_instance_id)
            .and_then(|ci| ci.business_key.as_deref());
        opt_eq(&q.case_execution_id, Some(&ce.id))
            && opt_eq(&q.case_instance_id, Some(&ce.case_instance_id))
            && opt_eq(&q.case_definition_id, Some(&ce.case_definition_id))
            && q.case_definition_key
                .as_deref()
                .is_none_or(|k| definition_key(&ce.case_definition_id) == k)
            && opt_eq(&q.business_key, business_key)
            && opt_eq(&q.activity_id, ce.activity_id.as_deref())
            && (!q.required || ce.required)
            && (!q.active || ce.active)
            && (!q.enabled || ce.enabled)
            && (!q.disabled || ce.disabled)
            && in_list(&q.tenant_id_in, ce.tenant_id.as_deref())
            && variables_match(&q.variables, self.case_execution_variables.get(&ce.id))
            && variables_match(&q.case_instance_variables, case_vars)
    }

    fn query_case_executions(&self, q: &CaseExecutionQuery) -> Vec<CaseExecution> {
        let mut executions: Vec<CaseExecution> = self
            .case_executions
            .values()
            .filter(|ce| self.case_execution_matches(ce, q))
            .cloned()
            .collect();
        apply_sort(&mut executions, &q.sorting, |a, b, key| match key {
            CaseExecutionSortKey::CaseExecutionId => a.id.cmp(&b.id),
            CaseExecutionSortKey::CaseInstanceId => a.case_instance_id.cmp(&b.case_instance_id),
            CaseExecutionSortKey::CaseDefinitionId => {
                a.case_definition_id.cmp(&b.case_definition_id)
            }
            CaseExecutionSortKey::CaseDefinitionKey => definition_key(&a.case_definition_id)
                .cmp(definition_key(&b.case_definition_id)),
            CaseExecutionSortKey::TenantId => a.tenant_id.cmp(&b.tenant_id),
        });
        executions
    }

    fn job_matches(&self, job: &Job, q: &JobQuery) -> bool {
        let job_type = job
            .job_definition_id
            .as_ref()
            .and_then(|id| self.job_definitions.get(id))
            .map(|jd| jd.job_type.as_str());
        opt_eq(&q.job_id, Some(&job.id))
            && opt_eq(&q.job_definition_id, job.job_definition_id.as_deref())
            && opt_eq(&q.process_instance_id, job.process_instance_id.as_deref())
            && opt_eq(&q.process_definition_id, job.process_definition_id.as_deref())
            && opt_eq(&q.process_definition_key, job.process_definition_key.as_deref())
            && opt_eq(&q.execution_id, job.execution_id.as_deref())
            && (!q.active || !job.suspended)
            && (!q.suspended || job.suspended)
            && (!q.with_retries_left || job.retries > 0)
            && (!q.no_retries_left || job.retries == 0)
            && (!q.executable || (job.retries > 0 && job.due_date.is_none_or(|d| d <= Utc::now())))
            && (!q.timers || job_type.is_some_and(|t| t.starts_with("timer")))
            && (!q.messages || job_type == Some("message"))
            && (!q.with_exception || job.exception_message.is_some())
            && opt_eq(&q.exception_message, job.exception_message.as_deref())
            && q.due_dates.iter().all(|f| {
                job.due_date.is_some_and(|d| {
                    VariableFilter::new("dueDate", f.operator, VariableValue::Date(f.value))
                        .matches(&VariableValue::Date(d))
                })
            })
            && q.priority_higher_than_or_equals
                .is_none_or(|p| job.priority >= p)
            && q.priority_lower_than_or_equals
                .is_none_or(|p| job.priority <= p)
            && in_list(&q.tenant_id_in, job.tenant_id.as_deref())
    }

    fn query_jobs(&self, q: &JobQuery) -> Vec<Job> {
        let mut jobs: Vec<Job> = self
            .jobs
            .values()
            .filter(|j| self.job_matches(j, q))
            .cloned()
            .collect();
        apply_sort(&mut jobs, &q.sorting, |a, b, key| match key {
            JobSortKey::JobId => a.id.cmp(&b.id),
            JobSortKey::ExecutionId => a.execution_id.cmp(&b.execution_id),
            JobSortKey::ProcessInstanceId => a.process_instance_id.cmp(&b.process_instance_id),
            JobSortKey::ProcessDefinitionId => {
                a.process_definition_id.cmp(&b.process_definition_id)
            }
            JobSortKey::ProcessDefinitionKey => {
                a.process_definition_key.cmp(&b.process_definition_key)
            }
            JobSortKey::JobPriority => a.priority.cmp(&b.priority),
            JobSortKey::JobRetries => a.retries.cmp(&b.retries),
            JobSortKey::JobDueDate => a.due_date.cmp(&b.due_date),
            JobSortKey::TenantId => a.tenant_id.cmp(&b.tenant_id),
        });
        jobs
    }

    fn job_definition_matches(&self, jd: &JobDefinition, q: &JobDefinitionQuery) -> bool {
        opt_eq(&q.job_definition_id, Some(&jd.id))
            && in_list(&q.activity_id_in, Some(&jd.activity_id))
            && opt_eq(&q.process_definition_id, Some(&jd.process_definition_id))
            && opt_eq(&q.process_definition_key, Some(&jd.process_definition_key))
            && opt_eq(&q.job_type, Some(&jd.job_type))
            && opt_eq(&q.job_configuration, jd.job_configuration.as_deref())
            && (!q.active || !jd.suspended)
            && (!q.suspended || jd.suspended)
            && (!q.with_overriding_job_priority || jd.overriding_job_priority.is_some())
            && in_list(&q.tenant_id_in, jd.tenant_id.as_deref())
    }

    fn query_job_definitions(&self, q: &JobDefinitionQuery) -> Vec<JobDefinition> {
        let mut definitions: Vec<JobDefinition> = self
            .job_definitions
            .values()
            .filter(|jd| self.job_definition_matches(jd, q))
            .cloned()
            .collect();
        apply_sort(&mut definitions, &q.sorting, |a, b, key| match key {
            JobDefinitionSortKey::JobDefinitionId => a.id.cmp(&b.id),
            JobDefinitionSortKey::ActivityId => a.activity_id.cmp(&b.activity_id),
            JobDefinitionSortKey::ProcessDefinitionId => {
                a.process_definition_id.cmp(&b.process_definition_id)
            }
            JobDefinitionSortKey::ProcessDefinitionKey => {
                a.process_definition_key.cmp(&b.process_definition_key)
            }
            JobDefinitionSortKey::JobType => a.job_type.cmp(&b.job_type),
            JobDefinitionSortKey::JobConfiguration => {
                a.job_configuration.cmp(&b.job_configuration)
            }
            JobDefinitionSortKey::TenantId => a.tenant_id.cmp(&b.tenant_id),
        });
        definitions
    }

    fn incident_matches(&self, incident: &Incident, q: &IncidentQuery) -> bool {
        opt_eq(&q.incident_id, Some(&incident.id))
            && opt_eq(&q.incident_type, Some(&incident.incident_type))
            && opt_eq(&q.incident_message, incident.incident_message.as_deref())
            && opt_eq(&q.process_definition_id, incident.process_definition_id.as_deref())
            && opt_eq(&q.process_instance_id, incident.process_instance_id.as_deref())
            && opt_eq(&q.execution_id, incident.execution_id.as_deref())
            && opt_eq(&q.activity_id, incident.activity_id.as_deref())
            && opt_eq(&q.cause_incident_id, incident.cause_incident_id.as_deref())
            && opt_eq(
                &q.root_cause_incident_id,
                incident.root_cause_incident_id.as_deref(),
            )
            && opt_eq(&q.configuration, incident.configuration.as_deref())
            && in_list(&q.job_definition_id_in, incident.job_definition_id.as_deref())
            && in_list(&q.tenant_id_in, incident.tenant_id.as_deref())
    }

    fn query_incidents(&self, q: &IncidentQuery) -> Vec<Incident> {
        let mut incidents: Vec<Incident> = self
            .incidents
            .values()
            .filter(|i| self.incident_matches(i, q))
            .cloned()
            .collect();
        apply_sort(&mut incidents, &q.sorting, |a, b, key| match key {
            IncidentSortKey::IncidentId => a.id.cmp(&b.id),
            IncidentSortKey::IncidentTimestamp => a.incident_timestamp.cmp(&b.incident_timestamp),
            IncidentSortKey::IncidentType => a.incident_type.cmp(&b.incident_type),
            IncidentSortKey::ExecutionId => a.execution_id.cmp(&b.execution_id),
            IncidentSortKey::ActivityId => a.activity_id.cmp(&b.activity_id),
            IncidentSortKey::ProcessInstanceId => {
                a.process_instance_id.cmp(&b.process_instance_id)
            }
            IncidentSortKey::ProcessDefinitionId => {
                a.process_definition_id.cmp(&b.process_definition_id)
            }
            IncidentSortKey::CauseIncidentId => a.cause_incident_id.cmp(&b.cause_incident_id),
            IncidentSortKey::RootCauseIncidentId => {
                a.root_cause_incident_id.cmp(&b.root_cause_incident_id)
            }
            IncidentSortKey::Configuration => a.configuration.cmp(&b.configuration),
            IncidentSortKey::TenantId => a.tenant_id.cmp(&b.tenant_id),
        });
        incidents
    }

    fn all_variable_instances(&self) -> Vec<VariableInstance> {
        let mut out = Vec::new();
        for (task_id, vars) in &self.task_variables {
            let task = self.tasks.get(task_id);
            for (name, value) in vars {
                out.push(VariableInstance {
                    id: format!("{task_id}:{name}"),
                    name: name.clone(),
                    value: value.clone(),
                    process_instance_id: task.and_then(|t| t.process_instance_id.clone()),
                    execution_id: task.and_then(|t| t.execution_id.clone()),
                    case_instance_id: None,
                    case_execution_id: None,
                    task_id: Some(task_id.clone()),
                    error_message: None,
                    tenant_id: task.and_then(|t| t.tenant_id.clone()),
                });
            }
        }
        for (instance_id, vars) in &self.instance_variables {
            let instance = self.process_instances.get(instance_id);
            for (name, value) in vars {
                out.push(VariableInstance {
                    id: format!("{instance_id}:{name}"),
                    name: name.clone(),
                    value: value.clone(),
                    process_instance_id: Some(instance_id.clone()),
                    execution_id: Some(instance_id.clone()),
                    case_instance_id: None,
                    case_execution_id: None,
                    task_id: None,
                    error_message: None,
                    tenant_id: instance.and_then(|i| i.tenant_id.clone()),
                });
            }
        }
        for (execution_id, vars) in &self.case_execution_variables {
            let execution = self.case_executions.get(execution_id);
            for (name, value) in vars {
                out.push(VariableInstance {
                    id: format!("{execution_id}:{name}"),
                    name: name.clone(),
                    value: value.clone(),
                    process_instance_id: None,
                    execution_id: None,
                    case_instance_id: execution.map(|e| e.case_instance_id.clone()),
                    case_execution_id: Some(execution_id.clone()),
                    task_id: None,
                    error_message: None,
                    tenant_id: execution.and_then(|e| e.tenant_id.clone()),
                });
            }
        }
        out
    }

    fn query_variable_instances(&self, q: &VariableInstanceQuery) -> Vec<VariableInstance> {
        let mut instances: Vec<VariableInstance> = self
            .all_variable_instances()
            .into_iter()
            .filter(|vi| {
                opt_eq(&q.variable_name, Some(&vi.name))
                    && opt_like(&q.variable_name_like, Some(&vi.name))
                    && in_list(&q.process_instance_id_in, vi.process_instance_id.as_deref())
                    && in_list(&q.execution_id_in, vi.execution_id.as_deref())
                    && in_list(&q.case_execution_id_in, vi.case_execution_id.as_deref())
                    && in_list(&q.activity_instance_id_in, vi.execution_id.as_deref())
                    && in_list(&q.task_id_in, vi.task_id.as_deref())
                    && in_list(&q.tenant_id_in, vi.tenant_id.as_deref())
                    && q.variable_values
                        .iter()
                        .all(|f| f.name == vi.name && f.matches(&vi.value))
            })
            .collect();
        apply_sort(&mut instances, &q.sorting, |a, b, key| match key {
            VariableInstanceSortKey::VariableName => a.name.cmp(&b.name),
            VariableInstanceSortKey::VariableType => {
                a.value.type_name().cmp(b.value.type_name())
            }
            VariableInstanceSortKey::ActivityInstanceId => a.execution_id.cmp(&b.execution_id),
            VariableInstanceSortKey::TenantId => a.tenant_id.cmp(&b.tenant_id),
        });
        instances
    }

    fn historic_instance_matches(
        &self,
        hpi: &HistoricProcessInstance,
        q: &HistoricProcessInstanceQuery,
    ) -> bool {
        opt_eq(&q.process_instance_id, Some(&hpi.id))
            && in_list(&q.process_instance_ids, Some(&hpi.id))
            && opt_eq(&q.process_definition_id, Some(&hpi.process_definition_id))
            && opt_eq(&q.process_definition_key, Some(&hpi.process_definition_key))
            && opt_eq(&q.process_instance_business_key, hpi.business_key.as_deref())
            && opt_like(
                &q.process_instance_business_key_like,
                hpi.business_key.as_deref(),
            )
            && (!q.finished || hpi.end_time.is_some())
            && (!q.unfinished || hpi.end_time.is_none())
            && before(&q.started_before, Some(hpi.start_time))
            && after(&q.started_after, Some(hpi.start_time))
            && before(&q.finished_before, hpi.end_time)
            && after(&q.finished_after, hpi.end_time)
            && opt_eq(&q.started_by, hpi.start_user_id.as_deref())
            && in_list(&q.tenant_id_in, hpi.tenant_id.as_deref())
            && q.variables.iter().all(|f| {
                self.historic_variables.values().any(|hv| {
                    hv.process_instance_id.as_deref() == Some(hpi.id.as_str())
                        && hv.name == f.name
                        && f.matches(&hv.value)
                })
            })
    }

    fn query_historic_process_instances(
        &self,
        q: &HistoricProcessInstanceQuery,
    ) -> Vec<HistoricProcessInstance> {
        let mut instances: Vec<HistoricProcessInstance> = self
            .historic_process_instances
            .values()
            .filter(|hpi| self.historic_instance_matches(hpi, q))
            .cloned()
            .collect();
        apply_sort(&mut instances, &q.sorting, |a, b, key| match key {
            HistoricProcessInstanceSortKey::InstanceId => a.id.cmp(&b.id),
            HistoricProcessInstanceSortKey::DefinitionId => {
                a.process_definition_id.cmp(&b.process_definition_id)
            }
            HistoricProcessInstanceSortKey::DefinitionKey => {
                a.process_definition_key.cmp(&b.process_definition_key)
            }
            HistoricProcessInstanceSortKey::BusinessKey => a.business_key.cmp(&b.business_key),
            HistoricProcessInstanceSortKey::StartTime => a.start_time.cmp(&b.start_time),
            HistoricProcessInstanceSortKey::EndTime => a.end_time.cmp(&b.end_time),
            HistoricProcessInstanceSortKey::Duration => {
                a.duration_in_millis.cmp(&b.duration_in_millis)
            }
            HistoricProcessInstanceSortKey::TenantId => a.tenant_id.cmp(&b.tenant_id),
        });
        instances
    }

    fn query_historic_variables(
        &self,
        q: &HistoricVariableInstanceQuery,
    ) -> Vec<HistoricVariableInstance> {
        let mut instances: Vec<HistoricVariableInstance> = self
            .historic_variables
            .values()
            .filter(|hv| {
                opt_eq(&q.variable_name, Some(&hv.name))
                    && opt_like(&q.variable_name_like, Some(&hv.name))
                    && q.variable_value
                        .as_ref()
                        .is_none_or(|f| f.name == hv.name && f.matches(&hv.value))
                    && opt_eq(&q.process_instance_id, hv.process_instance_id.as_deref())
                    && in_list(&q.task_id_in, hv.task_id.as_deref())
                    && in_list(&q.tenant_id_in, hv.tenant_id.as_deref())
            })
            .cloned()
            .collect();
        apply_sort(&mut instances, &q.sorting, |a, b, key| match key {
            HistoricVariableInstanceSortKey::InstanceId => {
                a.process_instance_id.cmp(&b.process_instance_id)
            }
            HistoricVariableInstanceSortKey::VariableName => a.name.cmp(&b.name),
            HistoricVariableInstanceSortKey::TenantId => a.tenant_id.cmp(&b.tenant_id),
        });
        instances
    }

    fn query_users(&self, q: &UserQuery) -> Vec<User> {
        let mut users: Vec<User> = self
            .users
            .values()
            .filter(|u| {
                opt_eq(&q.id, Some(&u.id))
                    && opt_eq(&q.first_name, u.first_name.as_deref())
                    && opt_like(&q.first_name_like, u.first_name.as_deref())
                    && opt_eq(&q.last_name, u.last_name.as_deref())
                    && opt_like(&q.last_name_like, u.last_name.as_deref())
                    && opt_eq(&q.email, u.email.as_deref())
                    && opt_like(&q.email_like, u.email.as_deref())
                    && q.member_of_group.as_ref().is_none_or(|g| {
                        self.group_members
                            .get(g)
                            .is_some_and(|members| members.contains(&u.id))
                    })
            })
            .cloned()
            .collect();
        apply_sort(&mut users, &q.sorting, |a, b, key| match key {
            UserSortKey::UserId => a.id.cmp(&b.id),
            UserSortKey::FirstName => a.first_name.cmp(&b.first_name),
            UserSortKey::LastName => a.last_name.cmp(&b.last_name),
            UserSortKey::Email => a.email.cmp(&b.email),
        });
        users
    }

    fn query_groups(&self, q: &GroupQuery) -> Vec<Group> {
        let mut groups: Vec<Group> = self
            .groups
            .values()
            .filter(|g| {
                opt_eq(&q.id, Some(&g.id))
                    && opt_eq(&q.name, g.name.as_deref())
                    && opt_like(&q.name_like, g.name.as_deref())
                    && opt_eq(&q.group_type, g.group_type.as_deref())
                    && q.member.as_ref().is_none_or(|u| {
                        self.group_members
                            .get(&g.id)
                            .is_some_and(|members| members.contains(u))
                    })
            })
            .cloned()
            .collect();
        apply_sort(&mut groups, &q.sorting, |a, b, key| match key {
            GroupSortKey::GroupId => a.id.cmp(&b.id),
            GroupSortKey::GroupName => a.name.cmp(&b.name),
            GroupSortKey::GroupType => a.group_type.cmp(&b.group_type),
        });
        groups
    }
}

/// `<key>:<version>:<uuid>` definition id convention; the key is the first
/// segment.
fn definition_key(definition_id: &str) -> &str {
    definition_id.split(':').next().unwrap_or(definition_id)
}

// ── Trait implementations ────────────────────────────────────

#[async_trait]
impl TaskService for MemoryEngine {
    async fn find_tasks(&self, query: TaskQuery, page: Pagination) -> Result<Vec<Task>> {
        let state = self.state.read().await;
        Ok(page.slice(state.query_tasks(&query)))
    }

    async fn count_tasks(&self, query: TaskQuery) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state.query_tasks(&query).len() as u64)
    }

    async fn get_task(&self, id: &str) -> Result<Task> {
        let state = self.state.read().await;
        state
            .tasks
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("Task", id))
    }

    async fn create_task(&self, new_task: NewTask) -> Result<Task> {
        let task = Task {
            id: new_task.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: new_task.name,
            assignee: new_task.assignee,
            owner: new_task.owner,
            created: Utc::now(),
            due: new_task.due,
            follow_up: new_task.follow_up,
            delegation_state: new_task.delegation_state,
            description: new_task.description,
            execution_id: None,
            parent_task_id: new_task.parent_task_id,
            priority: new_task.priority.unwrap_or(0),
            process_definition_id: None,
            process_instance_id: None,
            case_definition_id: None,
            case_instance_id: new_task.case_instance_id,
            case_execution_id: None,
            task_definition_key: None,
            suspended: false,
            tenant_id: new_task.tenant_id,
        };
        let mut state = self.state.write().await;
        if state.tasks.contains_key(&task.id) {
            return Err(EngineError::Engine(format!(
                "Task with id {} already exists",
                task.id
            )));
        }
        state.tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: &str, update: UpdateTask) -> Result<()> {
        let mut state = self.state.write().await;
        let task = state
            .tasks
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("Task", id))?;
        task.name = update.name;
        task.description = update.description;
        task.assignee = update.assignee;
        task.owner = update.owner;
        task.delegation_state = update.delegation_state;
        task.due = update.due;
        task.follow_up = update.follow_up;
        task.priority = update.priority.unwrap_or(0);
        task.parent_task_id = update.parent_task_id;
        task.case_instance_id = update.case_instance_id;
        task.tenant_id = update.tenant_id;
        Ok(())
    }

    async fn delete_task(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .tasks
            .remove(id)
            .ok_or_else(|| EngineError::not_found("Task", id))?;
        state.task_variables.remove(id);
        Ok(())
    }

    async fn claim(&self, id: &str, user_id: Option<&str>) -> Result<()> {
        let mut state = self.state.write().await;
        let task = state
            .tasks
            .get_mut(id)
            .ok_or_else(|| EngineError::Engine(format!("Cannot find task with id {id}")))?;
        match (task.assignee.as_deref(), user_id) {
            (Some(current), Some(user)) if current != user => Err(EngineError::Engine(format!(
                "Task '{id}' is already claimed by someone else."
            ))),
            _ => {
                task.assignee = user_id.map(str::to_string);
                Ok(())
            }
        }
    }

    async fn set_assignee(&self, id: &str, user_id: Option<&str>) -> Result<()> {
        let mut state = self.state.write().await;
        let task = state
            .tasks
            .get_mut(id)
            .ok_or_else(|| EngineError::Engine(format!("Cannot find task with id {id}")))?;
        task.assignee = user_id.map(str::to_string);
        Ok(())
    }

    async fn complete(&self, id: &str, variables: HashMap<String, VariableValue>) -> Result<()> {
        let mut state = self.state.write().await;
        let task = state
            .tasks
            .remove(id)
            .ok_or_else(|| EngineError::Engine(format!("Cannot find task with id {id}")))?;
        state.task_variables.remove(id);
        if let Some(instance_id) = task.process_instance_id {
            let scope = state.instance_variables.entry(instance_id).or_default();
            scope.extend(variables);
        }
        Ok(())
    }

    async fn resolve(&self, id: &str, variables: HashMap<String, VariableValue>) -> Result<()> {
        let mut state = self.state.write().await;
        let task = state
            .tasks
            .get_mut(id)
            .ok_or_else(|| EngineError::Engine(format!("Cannot find task with id {id}")))?;
        task.delegation_state = Some(DelegationState::Resolved);
        task.assignee = task.owner.clone();
        drop(task);
        state
            .task_variables
            .entry(id.to_string())
            .or_default()
            .extend(variables);
        Ok(())
    }

    async fn delegate(&self, id: &str, user_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let task = state
            .tasks
            .get_mut(id)
            .ok_or_else(|| EngineError::Engine(format!("Cannot find task with id {id}")))?;
        if task.owner.is_none() {
            task.owner = task.assignee.clone();
        }
        task.assignee = Some(user_id.to_string());
        task.delegation_state = Some(DelegationState::Pending);
        Ok(())
    }

    async fn get_task_variables(&self, id: &str) -> Result<HashMap<String, VariableValue>> {
        let state = self.state.read().await;
        if !state.tasks.contains_key(id) {
            return Err(EngineError::not_found("Task", id));
        }
        Ok(state.task_variables.get(id).cloned().unwrap_or_default())
    }

    async fn get_task_variable(&self, id: &str, name: &str) -> Result<VariableValue> {
        let state = self.state.read().await;
        if !state.tasks.contains_key(id) {
            return Err(EngineError::not_found("Task", id));
        }
        state
            .task_variables
            .get(id)
            .and_then(|vars| vars.get(name))
            .cloned()
            .ok_or_else(|| EngineError::not_found("Task variable", name))
    }

    async fn put_task_variable(&self, id: &str, name: &str, value: VariableValue) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.tasks.contains_key(id) {
            return Err(EngineError::not_found("Task", id));
        }
        state
            .task_variables
            .entry(id.to_string())
            .or_default()
            .insert(name.to_string(), value);
        Ok(())
    }

    async fn remove_task_variable(&self, id: &str, name: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.tasks.contains_key(id) {
            return Err(EngineError::not_found("Task", id));
        }
        if let Some(vars) = state.task_variables.get_mut(id) {
            vars.remove(name);
        }
        Ok(())
    }
}

#[async_trait]
impl RuntimeService for MemoryEngine {
    async fn find_process_instances(
        &self,
        query: ProcessInstanceQuery,
        page: Pagination,
    ) -> Result<Vec<ProcessInstance>> {
        let state = self.state.read().await;
        Ok(page.slice(state.query_process_instances(&query)))
    }

    async fn count_process_instances(&self, query: ProcessInstanceQuery) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state.query_process_instances(&query).len() as u64)
    }

    async fn get_process_instance(&self, id: &str) -> Result<ProcessInstance> {
        let state = self.state.read().await;
        state
            .process_instances
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("Process instance", id))
    }

    async fn delete_process_instance(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .process_instances
            .remove(id)
            .ok_or_else(|| EngineError::not_found("Process instance", id))?;
        state.instance_variables.remove(id);
        state.instance_parents.retain(|sub, sup| sub != id && sup.as_str() != id);
        state.tasks.retain(|_, t| t.process_instance_id.as_deref() != Some(id));
        state.subscriptions.retain(|s| s.process_instance_id != id);
        Ok(())
    }

    async fn set_process_instance_suspension(&self, id: &str, suspended: bool) -> Result<()> {
        let mut state = self.state.write().await;
        let instance = state
            .process_instances
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("Process instance", id))?;
        instance.suspended = suspended;
        drop(instance);
        for task in state.tasks.values_mut() {
            if task.process_instance_id.as_deref() == Some(id) {
                task.suspended = suspended;
            }
        }
        Ok(())
    }

    async fn get_instance_variables(&self, id: &str) -> Result<HashMap<String, VariableValue>> {
        let state = self.state.read().await;
        if !state.process_instances.contains_key(id) {
            return Err(EngineError::not_found("Process instance", id));
        }
        Ok(state.instance_variables.get(id).cloned().unwrap_or_default())
    }

    async fn get_instance_variable(&self, id: &str, name: &str) -> Result<VariableValue> {
        let state = self.state.read().await;
        if !state.process_instances.contains_key(id) {
            return Err(EngineError::not_found("Process instance", id));
        }
        state
            .instance_variables
            .get(id)
            .and_then(|vars| vars.get(name))
            .cloned()
            .ok_or_else(|| EngineError::not_found("Process instance variable", name))
    }

    async fn put_instance_variable(
        &self,
        id: &str,
        name: &str,
        value: VariableValue,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.process_instances.contains_key(id) {
            return Err(EngineError::not_found("Process instance", id));
        }
        state
            .instance_variables
            .entry(id.to_string())
            .or_default()
            .insert(name.to_string(), value);
        Ok(())
    }

    async fn remove_instance_variable(&self, id: &str, name: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.process_instances.contains_key(id) {
            return Err(EngineError::not_found("Process instance", id));
        }
        if let Some(vars) = state.instance_variables.get_mut(id) {
            vars.remove(name);
        }
        Ok(())
    }

    async fn correlate_message(
        &self,
        correlation: MessageCorrelation,
    ) -> Result<Vec<MessageCorrelationResult>> {
        let message_name = correlation
            .message_name
            .clone()
            .ok_or_else(|| EngineError::invalid("No message name supplied"))?;

        let mut state = self.state.write().await;
        let matching: Vec<MessageSubscription> = state
            .subscriptions
            .iter()
            .filter(|s| {
                if s.message_name != message_name {
                    return false;
                }
                let instance = state.process_instances.get(&s.process_instance_id);
                let business_key_ok = correlation.business_key.as_deref().is_none_or(|bk| {
                    instance.is_some_and(|pi| pi.business_key.as_deref() == Some(bk))
                });
                let keys_ok = correlation.correlation_keys.iter().all(|(name, value)| {
                    state
                        .instance_variables
                        .get(&s.process_instance_id)
                        .and_then(|vars| vars.get(name))
                        .is_some_and(|actual| actual == value)
                });
                business_key_ok && keys_ok
            })
            .cloned()
            .collect();

        if matching.is_empty() {
            return Err(EngineError::Engine(format!(
                "Cannot correlate message '{message_name}': No process definition or execution matches the parameters"
            )));
        }
        if !correlation.all && matching.len() > 1 {
            return Err(EngineError::Engine(format!(
                "Cannot correlate message '{message_name}': {} executions match the correlation keys",
                matching.len()
            )));
        }

        let mut results = Vec::with_capacity(matching.len());
        for subscription in matching {
            state
                .subscriptions
                .retain(|s| s.execution_id != subscription.execution_id);
            let scope = state
                .instance_variables
                .entry(subscription.process_instance_id.clone())
                .or_default();
            scope.extend(correlation.process_variables.clone());
            results.push(MessageCorrelationResult {
                result_type: CorrelationResultType::Execution,
                process_instance: None,
                execution: Some(ExecutionRef {
                    id: subscription.execution_id,
                    process_instance_id: subscription.process_instance_id,
                }),
            });
        }
        Ok(results)
    }
}

#[async_trait]
impl CaseService for MemoryEngine {
    async fn find_case_executions(
        &self,
        query: CaseExecutionQuery,
        page: Pagination,
    ) -> Result<Vec<CaseExecution>> {
        let state = self.state.read().await;
        Ok(page.slice(state.query_case_executions(&query)))
    }

    async fn count_case_executions(&self, query: CaseExecutionQuery) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state.query_case_executions(&query).len() as u64)
    }

    async fn get_case_execution(&self, id: &str) -> Result<CaseExecution> {
        let state = self.state.read().await;
        state
            .case_executions
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("Case execution", id))
    }
}

#[async_trait]
impl ManagementService for MemoryEngine {
    async fn find_jobs(&self, query: JobQuery, page: Pagination) -> Result<Vec<Job>> {
        let state = self.state.read().await;
        Ok(page.slice(state.query_jobs(&query)))
    }

    async fn count_jobs(&self, query: JobQuery) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state.query_jobs(&query).len() as u64)
    }

    async fn get_job(&self, id: &str) -> Result<Job> {
        let state = self.state.read().await;
        state
            .jobs
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("Job", id))
    }

    async fn delete_job(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .jobs
            .remove(id)
            .ok_or_else(|| EngineError::not_found("Job", id))?;
        Ok(())
    }

    async fn set_job_retries(&self, id: &str, retries: u32) -> Result<()> {
        let mut state = self.state.write().await;
        let job = state
            .jobs
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("Job", id))?;
        job.retries = retries as i32;
        if retries > 0 {
            job.exception_message = None;
        }
        Ok(())
    }

    async fn execute_job(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let job = state
            .jobs
            .get(id)
            .ok_or_else(|| EngineError::not_found("Job", id))?;
        if job.suspended {
            return Err(EngineError::Engine(format!("Job {id} is suspended")));
        }
        if let Some(message) = &job.exception_message {
            return Err(EngineError::Engine(message.clone()));
        }
        state.jobs.remove(id);
        Ok(())
    }

    async fn set_job_suspension(&self, id: &str, suspended: bool) -> Result<()> {
        let mut state = self.state.write().await;
        let job = state
            .jobs
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("Job", id))?;
        job.suspended = suspended;
        Ok(())
    }

    async fn find_job_definitions(
        &self,
        query: JobDefinitionQuery,
        page: Pagination,
    ) -> Result<Vec<JobDefinition>> {
        let state = self.state.read().await;
        Ok(page.slice(state.query_job_definitions(&query)))
    }

    async fn count_job_definitions(&self, query: JobDefinitionQuery) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state.query_job_definitions(&query).len() as u64)
    }

    async fn get_job_definition(&self, id: &str) -> Result<JobDefinition> {
        let state = self.state.read().await;
        state
            .job_definitions
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("Job definition", id))
    }

    async fn suspend_job_definition(
        &self,
        id: &str,
        include_jobs: bool,
        execution_date: Option<DateTime<Utc>>,
    ) -> Result<()> {
        self.set_definition_suspension(id, true, include_jobs, execution_date)
            .await
    }

    async fn activate_job_definition(
        &self,
        id: &str,
        include_jobs: bool,
        execution_date: Option<DateTime<Utc>>,
    ) -> Result<()> {
        self.set_definition_suspension(id, false, include_jobs, execution_date)
            .await
    }

    async fn set_job_retries_by_definition(&self, id: &str, retries: u32) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.job_definitions.contains_key(id) {
            return Err(EngineError::not_found("Job definition", id));
        }
        for job in state.jobs.values_mut() {
            if job.job_definition_id.as_deref() == Some(id) {
                job.retries = retries as i32;
            }
        }
        Ok(())
    }
}

impl MemoryEngine {
    async fn set_definition_suspension(
        &self,
        id: &str,
        suspended: bool,
        include_jobs: bool,
        _execution_date: Option<DateTime<Utc>>,
    ) -> Result<()> {
        // A delayed execution date would normally create a timer job; the
        // in-memory engine applies the transition immediately.
        let mut state = self.state.write().await;
        let definition = state
            .job_definitions
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("Job definition", id))?;
        definition.suspended = suspended;
        drop(definition);
        if include_jobs {
            for job in state.jobs.values_mut() {
                if job.job_definition_id.as_deref() == Some(id) {
                    job.suspended = suspended;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl IncidentService for MemoryEngine {
    async fn find_incidents(
        &self,
        query: IncidentQuery,
        page: Pagination,
    ) -> Result<Vec<Incident>> {
        let state = self.state.read().await;
        Ok(page.slice(state.query_incidents(&query)))
    }

    async fn count_incidents(&self, query: IncidentQuery) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state.query_incidents(&query).len() as u64)
    }

    async fn get_incident(&self, id: &str) -> Result<Incident> {
        let state = self.state.read().await;
        state
            .incidents
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("Incident", id))
    }

    async fn resolve_incident(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .incidents
            .remove(id)
            .ok_or_else(|| EngineError::not_found("Incident", id))?;
        Ok(())
    }
}

#[async_trait]
impl VariableInstanceService for MemoryEngine {
    async fn find_variable_instances(
        &self,
        query: VariableInstanceQuery,
        page: Pagination,
    ) -> Result<Vec<VariableInstance>> {
        let state = self.state.read().await;
        Ok(page.slice(state.query_variable_instances(&query)))
    }

    async fn count_variable_instances(&self, query: VariableInstanceQuery) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state.query_variable_instances(&query).len() as u64)
    }
}

#[async_trait]
impl HistoryService for MemoryEngine {
    async fn find_historic_process_instances(
        &self,
        query: HistoricProcessInstanceQuery,
        page: Pagination,
    ) -> Result<Vec<HistoricProcessInstance>> {
        let state = self.state.read().await;
        Ok(page.slice(state.query_historic_process_instances(&query)))
    }

    async fn count_historic_process_instances(
        &self,
        query: HistoricProcessInstanceQuery,
    ) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state.query_historic_process_instances(&query).len() as u64)
    }

    async fn get_historic_process_instance(&self, id: &str) -> Result<HistoricProcessInstance> {
        let state = self.state.read().await;
        state
            .historic_process_instances
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("Historic process instance", id))
    }

    async fn delete_historic_process_instance(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .historic_process_instances
            .remove(id)
            .ok_or_else(|| EngineError::not_found("Historic process instance", id))?;
        state
            .historic_variables
            .retain(|_, hv| hv.process_instance_id.as_deref() != Some(id));
        Ok(())
    }

    async fn find_historic_variable_instances(
        &self,
        query: HistoricVariableInstanceQuery,
        page: Pagination,
    ) -> Result<Vec<HistoricVariableInstance>> {
        let state = self.state.read().await;
        Ok(page.slice(state.query_historic_variables(&query)))
    }

    async fn count_historic_variable_instances(
        &self,
        query: HistoricVariableInstanceQuery,
    ) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state.query_historic_variables(&query).len() as u64)
    }
}

#[async_trait]
impl IdentityService for MemoryEngine {
    async fn find_users(&self, query: UserQuery, page: Pagination) -> Result<Vec<User>> {
        let state = self.state.read().await;
        Ok(page.slice(state.query_users(&query)))
    }

    async fn count_users(&self, query: UserQuery) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state.query_users(&query).len() as u64)
    }

    async fn get_user(&self, id: &str) -> Result<User> {
        let state = self.state.read().await;
        state
            .users
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("User", id))
    }

    async fn create_user(&self, new_user: NewUser) -> Result<()> {
        let profile = new_user
            .profile
            .ok_or_else(|| EngineError::invalid("request object must provide a profile"))?;
        let mut state = self.state.write().await;
        if state.users.contains_key(&profile.id) {
            return Err(EngineError::Engine(format!(
                "The user already exists: {}",
                profile.id
            )));
        }
        state.users.insert(profile.id.clone(), profile);
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .users
            .remove(id)
            .ok_or_else(|| EngineError::not_found("User", id))?;
        for members in state.group_members.values_mut() {
            members.retain(|m| m != id);
        }
        Ok(())
    }

    async fn find_groups(&self, query: GroupQuery, page: Pagination) -> Result<Vec<Group>> {
        let state = self.state.read().await;
        Ok(page.slice(state.query_groups(&query)))
    }

    async fn count_groups(&self, query: GroupQuery) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state.query_groups(&query).len() as u64)
    }

    async fn get_group(&self, id: &str) -> Result<Group> {
        let state = self.state.read().await;
        state
            .groups
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("Group", id))
    }
}

#[async_trait]
impl AuthorizationService for MemoryEngine {
    async fn is_user_authorized(
        &self,
        user_id: Option<&str>,
        permission: Permission,
        resource: Resource,
        resource_id: Option<&str>,
    ) -> Result<bool> {
        let state = self.state.read().await;
        if !state.authorization_enabled {
            return Ok(true);
        }
        let Some(user_id) = user_id else {
            return Ok(false);
        };
        Ok(state.grants.iter().any(|g| {
            g.user_id == user_id
                && g.permission == permission
                && g.resource == resource
                && (g.resource_id.is_none() || g.resource_id.as_deref() == resource_id)
        }))
    }
}

#[async_trait]
impl FilterService for MemoryEngine {
    async fn find_filters(
        &self,
        resource_type: Option<&str>,
        page: Pagination,
    ) -> Result<Vec<Filter>> {
        let state = self.state.read().await;
        let mut filters: Vec<Filter> = state
            .filters
            .values()
            .filter(|f| resource_type.is_none_or(|rt| f.resource_type == rt))
            .cloned()
            .collect();
        filters.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(page.slice(filters))
    }

    async fn count_filters(&self, resource_type: Option<&str>) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state
            .filters
            .values()
            .filter(|f| resource_type.is_none_or(|rt| f.resource_type == rt))
            .count() as u64)
    }

    async fn get_filter(&self, id: &str) -> Result<Filter> {
        let state = self.state.read().await;
        state
            .filters
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("Filter", id))
    }

    async fn create_filter(&self, new_filter: NewFilter) -> Result<Filter> {
        let resource_type = new_filter
            .resource_type
            .ok_or_else(|| EngineError::invalid("Filter cannot be created: no resource type"))?;
        if resource_type != "Task" {
            return Err(EngineError::invalid(format!(
                "Unable to initialize filter of invalid type {resource_type}"
            )));
        }
        let filter = Filter {
            id: Uuid::new_v4().to_string(),
            resource_type,
            name: new_filter
                .name
                .ok_or_else(|| EngineError::invalid("Filter cannot be created: no name"))?,
            owner: new_filter.owner,
            query: new_filter.query.unwrap_or_default(),
            properties: new_filter.properties,
        };
        self.state
            .write()
            .await
            .filters
            .insert(filter.id.clone(), filter.clone());
        Ok(filter)
    }

    async fn update_filter(&self, id: &str, update: NewFilter) -> Result<()> {
        let mut state = self.state.write().await;
        let filter = state
            .filters
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("Filter", id))?;
        if let Some(name) = update.name {
            filter.name = name;
        }
        if let Some(owner) = update.owner {
            filter.owner = Some(owner);
        }
        if let Some(query) = update.query {
            filter.query = query;
        }
        if update.properties.is_some() {
            filter.properties = update.properties;
        }
        Ok(())
    }

    async fn delete_filter(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .filters
            .remove(id)
            .ok_or_else(|| EngineError::not_found("Filter", id))?;
        Ok(())
    }

    async fn execute_list(
        &self,
        id: &str,
        extending: Option<TaskQuery>,
        page: Pagination,
    ) -> Result<Vec<Task>> {
        let state = self.state.read().await;
        let filter = state
            .filters
            .get(id)
            .ok_or_else(|| EngineError::not_found("Filter", id))?;
        let query = match extending {
            Some(ext) => extend_task_query(&filter.query, ext),
            None => filter.query.clone(),
        };
        Ok(page.slice(state.query_tasks(&query)))
    }

    async fn execute_single(
        &self,
        id: &str,
        extending: Option<TaskQuery>,
    ) -> Result<Option<Task>> {
        let mut tasks = self.execute_list(id, extending, Pagination::default()).await?;
        if tasks.len() > 1 {
            return Err(EngineError::Engine(format!(
                "Filter does not return a unique result: {} results found",
                tasks.len()
            )));
        }
        Ok(tasks.pop())
    }

    async fn execute_count(&self, id: &str, extending: Option<TaskQuery>) -> Result<u64> {
        Ok(self
            .execute_list(id, extending, Pagination::default())
            .await?
            .len() as u64)
    }
}
