use serde::{Deserialize, Serialize};

use crate::query::TaskQuery;

/// A stored task query that can be re-executed via `/filter/{id}/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub id: String,
    pub resource_type: String,
    pub name: String,
    pub owner: Option<String>,
    pub query: TaskQuery,
    pub properties: Option<serde_json::Value>,
}

/// Body of `POST /filter/create` and `PUT /filter/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewFilter {
    pub resource_type: Option<String>,
    pub name: Option<String>,
    pub owner: Option<String>,
    pub query: Option<TaskQuery>,
    pub properties: Option<serde_json::Value>,
}
