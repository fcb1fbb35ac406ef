//! Query and command model shared by the REST layer and the service traits.
//!
//! Each query endpoint binds its parameters into one of the structs below; the
//! POST variant of a query deserializes the same struct from a JSON body, so
//! GET and POST accept an identical filter set. Sort keys are small enums with
//! `from_param` on the wire names; an unknown `sortBy` is a binding error, not
//! a service error.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::{DelegationState, VariableValue};

// ── Pagination ───────────────────────────────────────────────

/// `firstResult` / `maxResults` window. Missing `firstResult` means 0,
/// missing `maxResults` means no limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub first_result: usize,
    pub max_results: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            first_result: 0,
            max_results: usize::MAX,
        }
    }
}

impl Pagination {
    pub fn window(first_result: usize, max_results: usize) -> Self {
        Self {
            first_result,
            max_results,
        }
    }

    /// Apply the window to an already-sorted result set.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.first_result)
            .take(self.max_results)
            .collect()
    }
}

// ── Sorting ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_param(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// One `sortBy`/`sortOrder` pair. Queries hold a `Vec` so secondary sort
/// criteria keep their order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sorting<K> {
    pub sort_by: K,
    pub sort_order: SortOrder,
}

impl<K> Sorting<K> {
    pub fn new(sort_by: K, sort_order: SortOrder) -> Self {
        Self {
            sort_by,
            sort_order,
        }
    }
}

macro_rules! sort_key {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $param:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn from_param(s: &str) -> Option<Self> {
                match s {
                    $($param => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn as_param(&self) -> &'static str {
                match self {
                    $(Self::$variant => $param),+
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let s = String::deserialize(d)?;
                Self::from_param(&s).ok_or_else(|| {
                    DeError::custom(format!("Cannot set query parameter 'sortBy' to value '{s}'"))
                })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(self.as_param())
            }
        }
    };
}

sort_key!(TaskSortKey {
    Id => "id",
    Name => "name",
    NameCaseInsensitive => "nameCaseInsensitive",
    Assignee => "assignee",
    Created => "created",
    Description => "description",
    DueDate => "dueDate",
    FollowUpDate => "followUpDate",
    Priority => "priority",
    InstanceId => "instanceId",
    ExecutionId => "executionId",
    CaseInstanceId => "caseInstanceId",
    CaseExecutionId => "caseExecutionId",
    TenantId => "tenantId",
});

sort_key!(ProcessInstanceSortKey {
    InstanceId => "instanceId",
    DefinitionId => "definitionId",
    DefinitionKey => "definitionKey",
    BusinessKey => "businessKey",
    TenantId => "tenantId",
});

sort_key!(CaseExecutionSortKey {
    CaseExecutionId => "caseExecutionId",
    CaseInstanceId => "caseInstanceId",
    CaseDefinitionId => "caseDefinitionId",
    CaseDefinitionKey => "caseDefinitionKey",
    TenantId => "tenantId",
});

sort_key!(JobSortKey {
    JobId => "jobId",
    ExecutionId => "executionId",
    ProcessInstanceId => "processInstanceId",
    ProcessDefinitionId => "processDefinitionId",
    ProcessDefinitionKey => "processDefinitionKey",
    JobPriority => "jobPriority",
    JobRetries => "jobRetries",
    JobDueDate => "jobDueDate",
    TenantId => "tenantId",
});

sort_key!(JobDefinitionSortKey {
    JobDefinitionId => "jobDefinitionId",
    ActivityId => "activityId",
    ProcessDefinitionId => "processDefinitionId",
    ProcessDefinitionKey => "processDefinitionKey",
    JobType => "jobType",
    JobConfiguration => "jobConfiguration",
    TenantId => "tenantId",
});

sort_key!(IncidentSortKey {
    IncidentId => "incidentId",
    IncidentTimestamp => "incidentTimestamp",
    IncidentType => "incidentType",
    ExecutionId => "executionId",
    ActivityId => "activityId",
    ProcessInstanceId => "processInstanceId",
    ProcessDefinitionId => "processDefinitionId",
    CauseIncidentId => "causeIncidentId",
    RootCauseIncidentId => "rootCauseIncidentId",
    Configuration => "configuration",
    TenantId => "tenantId",
});

sort_key!(VariableInstanceSortKey {
    VariableName => "variableName",
    VariableType => "variableType",
    ActivityInstanceId => "activityInstanceId",
    TenantId => "tenantId",
});

sort_key!(HistoricProcessInstanceSortKey {
    InstanceId => "instanceId",
    DefinitionId => "definitionId",
    DefinitionKey => "definitionKey",
    BusinessKey => "businessKey",
    StartTime => "startTime",
    EndTime => "endTime",
    Duration => "duration",
    TenantId => "tenantId",
});

sort_key!(HistoricVariableInstanceSortKey {
    InstanceId => "instanceId",
    VariableName => "variableName",
    TenantId => "tenantId",
});

sort_key!(UserSortKey {
    UserId => "userId",
    FirstName => "firstName",
    LastName => "lastName",
    Email => "email",
});

sort_key!(GroupSortKey {
    GroupId => "id",
    GroupName => "name",
    GroupType => "type",
});

// ── Variable filters ─────────────────────────────────────────

/// Comparators accepted in `name_<op>_value` filter expressions and in the
/// `operator` field of a POST query body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Neq,
    Gt,
    Gteq,
    Lt,
    Lteq,
    Like,
}

impl Comparator {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "eq" => Some(Self::Eq),
            "neq" => Some(Self::Neq),
            "gt" => Some(Self::Gt),
            "gteq" => Some(Self::Gteq),
            "lt" => Some(Self::Lt),
            "lteq" => Some(Self::Lteq),
            "like" => Some(Self::Like),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gteq => "gteq",
            Self::Lt => "lt",
            Self::Lteq => "lteq",
            Self::Like => "like",
        }
    }
}

impl Serialize for Comparator {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Comparator {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Self::from_str(&s).ok_or_else(|| {
            DeError::custom(format!("Invalid variable comparator specified: {s}"))
        })
    }
}

/// One variable condition: `name <op> value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableFilter {
    pub name: String,
    pub operator: Comparator,
    pub value: VariableValue,
}

impl<'de> Deserialize<'de> for VariableFilter {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            name: String,
            operator: Comparator,
            #[serde(default)]
            value: serde_json::Value,
        }
        let raw = Raw::deserialize(d)?;
        Ok(Self {
            name: raw.name,
            operator: raw.operator,
            value: VariableValue::infer(raw.value),
        })
    }
}

impl VariableFilter {
    pub fn new(name: impl Into<String>, operator: Comparator, value: VariableValue) -> Self {
        Self {
            name: name.into(),
            operator,
            value,
        }
    }

    /// Evaluate the condition against a concrete value.
    pub fn matches(&self, actual: &VariableValue) -> bool {
        use std::cmp::Ordering::*;
        match self.operator {
            Comparator::Eq => actual == &self.value,
            Comparator::Neq => actual != &self.value,
            Comparator::Like => {
                if let VariableValue::String(pattern) = &self.value {
                    actual.like(pattern)
                } else {
                    false
                }
            }
            ordering_op => match actual.partial_cmp_value(&self.value) {
                None => false,
                Some(ord) => match ordering_op {
                    Comparator::Gt => ord == Greater,
                    Comparator::Gteq => ord != Less,
                    Comparator::Lt => ord == Less,
                    Comparator::Lteq => ord != Greater,
                    _ => unreachable!(),
                },
            },
        }
    }
}

/// Date condition used by the job query's `dueDates` parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateFilter {
    pub operator: Comparator,
    pub value: DateTime<Utc>,
}

// ── Per-entity queries ───────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskQuery {
    pub process_instance_id: Option<String>,
    pub process_instance_business_key: Option<String>,
    pub process_instance_business_key_like: Option<String>,
    pub process_definition_id: Option<String>,
    pub process_definition_key: Option<String>,
    pub execution_id: Option<String>,
    pub case_instance_id: Option<String>,
    pub case_execution_id: Option<String>,
    pub name: Option<String>,
    pub name_like: Option<String>,
    pub description: Option<String>,
    pub description_like: Option<String>,
    pub assignee: Option<String>,
    pub assignee_like: Option<String>,
    pub owner: Option<String>,
    pub candidate_group: Option<String>,
    pub candidate_groups: Vec<String>,
    pub candidate_user: Option<String>,
    pub involved_user: Option<String>,
    pub priority: Option<i32>,
    pub min_priority: Option<i32>,
    pub max_priority: Option<i32>,
    pub due_date: Option<DateTime<Utc>>,
    pub due_before: Option<DateTime<Utc>>,
    pub due_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub created_after: Option<DateTime<Utc>>,
    pub delegation_state: Option<DelegationState>,
    pub task_definition_key: Option<String>,
    pub task_definition_key_like: Option<String>,
    pub unassigned: bool,
    pub active: bool,
    pub suspended: bool,
    pub tenant_id_in: Vec<String>,
    pub task_variables: Vec<VariableFilter>,
    pub process_variables: Vec<VariableFilter>,
    pub sorting: Vec<Sorting<TaskSortKey>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessInstanceQuery {
    pub process_instance_ids: Vec<String>,
    pub business_key: Option<String>,
    pub business_key_like: Option<String>,
    pub case_instance_id: Option<String>,
    pub process_definition_id: Option<String>,
    pub process_definition_key: Option<String>,
    pub super_process_instance: Option<String>,
    pub sub_process_instance: Option<String>,
    pub active: bool,
    pub suspended: bool,
    pub incident_id: Option<String>,
    pub incident_type: Option<String>,
    pub tenant_id_in: Vec<String>,
    pub variables: Vec<VariableFilter>,
    pub sorting: Vec<Sorting<ProcessInstanceSortKey>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseExecutionQuery {
    pub case_execution_id: Option<String>,
    pub case_instance_id: Option<String>,
    pub case_definition_id: Option<String>,
    pub case_definition_key: Option<String>,
    pub business_key: Option<String>,
    pub activity_id: Option<String>,
    pub required: bool,
    pub active: bool,
    pub enabled: bool,
    pub disabled: bool,
    pub tenant_id_in: Vec<String>,
    pub variables: Vec<VariableFilter>,
    pub case_instance_variables: Vec<VariableFilter>,
    pub sorting: Vec<Sorting<CaseExecutionSortKey>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobQuery {
    pub job_id: Option<String>,
    pub job_definition_id: Option<String>,
    pub process_instance_id: Option<String>,
    pub process_definition_id: Option<String>,
    pub process_definition_key: Option<String>,
    pub execution_id: Option<String>,
    pub active: bool,
    pub suspended: bool,
    pub with_retries_left: bool,
    pub no_retries_left: bool,
    pub executable: bool,
    pub timers: bool,
    pub messages: bool,
    pub with_exception: bool,
    pub exception_message: Option<String>,
    pub due_dates: Vec<DateFilter>,
    pub priority_higher_than_or_equals: Option<i64>,
    pub priority_lower_than_or_equals: Option<i64>,
    pub tenant_id_in: Vec<String>,
    pub sorting: Vec<Sorting<JobSortKey>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobDefinitionQuery {
    pub job_definition_id: Option<String>,
    pub activity_id_in: Vec<String>,
    pub process_definition_id: Option<String>,
    pub process_definition_key: Option<String>,
    pub job_type: Option<String>,
    pub job_configuration: Option<String>,
    pub active: bool,
    pub suspended: bool,
    pub with_overriding_job_priority: bool,
    pub tenant_id_in: Vec<String>,
    pub sorting: Vec<Sorting<JobDefinitionSortKey>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncidentQuery {
    pub incident_id: Option<String>,
    pub incident_type: Option<String>,
    pub incident_message: Option<String>,
    pub process_definition_id: Option<String>,
    pub process_instance_id: Option<String>,
    pub execution_id: Option<String>,
    pub activity_id: Option<String>,
    pub cause_incident_id: Option<String>,
    pub root_cause_incident_id: Option<String>,
    pub configuration: Option<String>,
    pub job_definition_id_in: Vec<String>,
    pub tenant_id_in: Vec<String>,
    pub sorting: Vec<Sorting<IncidentSortKey>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VariableInstanceQuery {
    pub variable_name: Option<String>,
    pub variable_name_like: Option<String>,
    pub process_instance_id_in: Vec<String>,
    pub execution_id_in: Vec<String>,
    pub case_execution_id_in: Vec<String>,
    pub task_id_in: Vec<String>,
    pub activity_instance_id_in: Vec<String>,
    pub variable_values: Vec<VariableFilter>,
    pub tenant_id_in: Vec<String>,
    pub sorting: Vec<Sorting<VariableInstanceSortKey>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoricProcessInstanceQuery {
    pub process_instance_id: Option<String>,
    pub process_instance_ids: Vec<String>,
    pub process_definition_id: Option<String>,
    pub process_definition_key: Option<String>,
    pub process_instance_business_key: Option<String>,
    pub process_instance_business_key_like: Option<String>,
    pub finished: bool,
    pub unfinished: bool,
    pub started_before: Option<DateTime<Utc>>,
    pub started_after: Option<DateTime<Utc>>,
    pub finished_before: Option<DateTime<Utc>>,
    pub finished_after: Option<DateTime<Utc>>,
    pub started_by: Option<String>,
    pub tenant_id_in: Vec<String>,
    pub variables: Vec<VariableFilter>,
    pub sorting: Vec<Sorting<HistoricProcessInstanceSortKey>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoricVariableInstanceQuery {
    pub variable_name: Option<String>,
    pub variable_name_like: Option<String>,
    pub variable_value: Option<VariableFilter>,
    pub process_instance_id: Option<String>,
    pub task_id_in: Vec<String>,
    pub tenant_id_in: Vec<String>,
    pub sorting: Vec<Sorting<HistoricVariableInstanceSortKey>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserQuery {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub first_name_like: Option<String>,
    pub last_name: Option<String>,
    pub last_name_like: Option<String>,
    pub email: Option<String>,
    pub email_like: Option<String>,
    pub member_of_group: Option<String>,
    pub sorting: Vec<Sorting<UserSortKey>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupQuery {
    pub id: Option<String>,
    pub name: Option<String>,
    pub name_like: Option<String>,
    #[serde(rename = "type")]
    pub group_type: Option<String>,
    pub member: Option<String>,
    pub sorting: Vec<Sorting<GroupSortKey>>,
}

// ── Message correlation command ──────────────────────────────

/// Body of `POST /message`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageCorrelation {
    pub message_name: Option<String>,
    pub business_key: Option<String>,
    pub correlation_keys: HashMap<String, VariableValue>,
    pub process_variables: HashMap<String, VariableValue>,
    pub all: bool,
    pub result_enabled: bool,
}
