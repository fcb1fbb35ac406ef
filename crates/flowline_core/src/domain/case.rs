use serde::{Deserialize, Serialize};

/// A case plan-item execution (CMMN side of the engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseExecution {
    pub id: String,
    pub case_instance_id: String,
    pub case_definition_id: String,
    pub activity_id: Option<String>,
    pub activity_name: Option<String>,
    pub activity_type: Option<String>,
    pub parent_id: Option<String>,
    pub active: bool,
    pub enabled: bool,
    pub disabled: bool,
    pub required: bool,
    pub tenant_id: Option<String>,
}
