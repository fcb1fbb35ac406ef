use serde::{Deserialize, Serialize};

/// A running (or historic-root) process instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInstance {
    pub id: String,
    pub definition_id: String,
    pub business_key: Option<String>,
    pub case_instance_id: Option<String>,
    pub ended: bool,
    pub suspended: bool,
    pub tenant_id: Option<String>,
}

/// Minimal execution reference returned by message correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRef {
    pub id: String,
    pub process_instance_id: String,
}

/// Outcome of one message correlation, reported when `resultEnabled` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCorrelationResult {
    pub result_type: CorrelationResultType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_instance: Option<ProcessInstance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<ExecutionRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrelationResultType {
    Execution,
    ProcessDefinition,
}
