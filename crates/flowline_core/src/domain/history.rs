use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::variables::VariableValue;

/// Terminal (or current) state of a historic process instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoricProcessInstanceState {
    Active,
    Suspended,
    Completed,
    ExternallyTerminated,
    InternallyTerminated,
}

/// Audit-trail record of a process instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricProcessInstance {
    pub id: String,
    pub business_key: Option<String>,
    pub process_definition_id: String,
    pub process_definition_key: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_in_millis: Option<i64>,
    pub start_user_id: Option<String>,
    pub start_activity_id: Option<String>,
    pub delete_reason: Option<String>,
    pub state: HistoricProcessInstanceState,
    pub tenant_id: Option<String>,
}

/// Audit-trail record of a variable's latest value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricVariableInstance {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub value: VariableValue,
    pub process_instance_id: Option<String>,
    pub task_id: Option<String>,
    pub state: String,
    pub error_message: Option<String>,
    pub tenant_id: Option<String>,
}
