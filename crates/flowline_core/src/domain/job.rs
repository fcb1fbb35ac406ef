use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A background job owned by the engine's job executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub job_definition_id: Option<String>,
    pub process_instance_id: Option<String>,
    pub process_definition_id: Option<String>,
    pub process_definition_key: Option<String>,
    pub execution_id: Option<String>,
    pub exception_message: Option<String>,
    pub retries: i32,
    pub due_date: Option<DateTime<Utc>>,
    pub suspended: bool,
    pub priority: i64,
    pub tenant_id: Option<String>,
}

/// Declarative job metadata attached to an activity of a process definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDefinition {
    pub id: String,
    pub process_definition_id: String,
    pub process_definition_key: String,
    pub activity_id: String,
    pub job_type: String,
    pub job_configuration: Option<String>,
    pub suspended: bool,
    pub overriding_job_priority: Option<i64>,
    pub tenant_id: Option<String>,
}
