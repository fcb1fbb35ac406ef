use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded failure (failed job, external task error, ...) attached to an
/// execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub process_definition_id: Option<String>,
    pub process_instance_id: Option<String>,
    pub execution_id: Option<String>,
    pub incident_timestamp: DateTime<Utc>,
    pub incident_type: String,
    pub activity_id: Option<String>,
    pub cause_incident_id: Option<String>,
    pub root_cause_incident_id: Option<String>,
    pub configuration: Option<String>,
    pub incident_message: Option<String>,
    pub job_definition_id: Option<String>,
    pub tenant_id: Option<String>,
}
