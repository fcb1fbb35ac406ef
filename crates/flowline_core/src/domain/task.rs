use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delegation lifecycle of a user task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DelegationState {
    Pending,
    Resolved,
}

impl DelegationState {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "RESOLVED" => Some(Self::Resolved),
            _ => None,
        }
    }
}

/// A user task waiting for human work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: Option<String>,
    pub assignee: Option<String>,
    pub owner: Option<String>,
    pub created: DateTime<Utc>,
    pub due: Option<DateTime<Utc>>,
    pub follow_up: Option<DateTime<Utc>>,
    pub delegation_state: Option<DelegationState>,
    pub description: Option<String>,
    pub execution_id: Option<String>,
    pub parent_task_id: Option<String>,
    pub priority: i32,
    pub process_definition_id: Option<String>,
    pub process_instance_id: Option<String>,
    pub case_definition_id: Option<String>,
    pub case_instance_id: Option<String>,
    pub case_execution_id: Option<String>,
    pub task_definition_key: Option<String>,
    pub suspended: bool,
    pub tenant_id: Option<String>,
}

/// Body of `POST /task/create`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTask {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub owner: Option<String>,
    pub delegation_state: Option<DelegationState>,
    pub due: Option<DateTime<Utc>>,
    pub follow_up: Option<DateTime<Utc>>,
    pub priority: Option<i32>,
    pub parent_task_id: Option<String>,
    pub case_instance_id: Option<String>,
    pub tenant_id: Option<String>,
}

/// Body of `PUT /task/{id}` — absent fields clear the corresponding value,
/// matching the original update semantics (full replace, not patch).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateTask {
    pub name: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub owner: Option<String>,
    pub delegation_state: Option<DelegationState>,
    pub due: Option<DateTime<Utc>>,
    pub follow_up: Option<DateTime<Utc>>,
    pub priority: Option<i32>,
    pub parent_task_id: Option<String>,
    pub case_instance_id: Option<String>,
    pub tenant_id: Option<String>,
}
