//! Typed variable values and the `{value, type}` wire shape.
//!
//! The REST layer exchanges variables as `{"value": <json>, "type": <name>}`.
//! Untyped payloads (no `type` field) infer the type from the JSON value.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq)]
pub enum VariableValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Date(DateTime<Utc>),
    Json(serde_json::Value),
}

impl VariableValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Boolean(_) => "Boolean",
            Self::Integer(_) => "Integer",
            Self::Double(_) => "Double",
            Self::String(_) => "String",
            Self::Date(_) => "Date",
            Self::Json(_) => "Json",
        }
    }

    fn to_json_value(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Boolean(b) => (*b).into(),
            Self::Integer(i) => (*i).into(),
            Self::Double(d) => {
                serde_json::Number::from_f64(*d).map_or(serde_json::Value::Null, Into::into)
            }
            Self::String(s) => s.clone().into(),
            Self::Date(d) => d.to_rfc3339().into(),
            Self::Json(v) => v.clone(),
        }
    }

    fn from_parts(
        value: serde_json::Value,
        type_name: Option<&str>,
    ) -> Result<Self, String> {
        match type_name {
            None => Ok(Self::infer(value)),
            Some("Null") => Ok(Self::Null),
            Some("Boolean") => match value {
                serde_json::Value::Bool(b) => Ok(Self::Boolean(b)),
                other => Err(format!("cannot read {other} as Boolean")),
            },
            Some("Integer") | Some("Long") | Some("Short") => value
                .as_i64()
                .map(Self::Integer)
                .ok_or_else(|| format!("cannot read {value} as Integer")),
            Some("Double") => value
                .as_f64()
                .map(Self::Double)
                .ok_or_else(|| format!("cannot read {value} as Double")),
            Some("String") => match value {
                serde_json::Value::String(s) => Ok(Self::String(s)),
                other => Err(format!("cannot read {other} as String")),
            },
            Some("Date") => match value {
                serde_json::Value::String(s) => s
                    .parse::<DateTime<Utc>>()
                    .map(Self::Date)
                    .map_err(|_| format!("cannot read '{s}' as Date")),
                other => Err(format!("cannot read {other} as Date")),
            },
            Some("Json") | Some("Object") => Ok(Self::Json(value)),
            Some(other) => Err(format!("unsupported variable type '{other}'")),
        }
    }

    /// Infer the variable type from an untyped JSON value.
    pub fn infer(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else {
                    Self::Double(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            other => Self::Json(other),
        }
    }

    /// Value ordering across same-typed values; `None` when incomparable.
    pub fn partial_cmp_value(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Double(b)) => (*a as f64).partial_cmp(b),
            (Self::Double(a), Self::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Double(a), Self::Double(b)) => a.partial_cmp(b),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// SQL-LIKE match with `%` wildcards; only meaningful for strings.
    pub fn like(&self, pattern: &str) -> bool {
        let Self::String(s) = self else { return false };
        like_match(s, pattern)
    }
}

pub(crate) fn like_match(s: &str, pattern: &str) -> bool {
    // Translate the LIKE pattern into anchored fragment matching.
    let fragments: Vec<&str> = pattern.split('%').collect();
    let mut rest = s;
    for (i, frag) in fragments.iter().enumerate() {
        if frag.is_empty() {
            continue;
        }
        if i == 0 {
            match rest.strip_prefix(frag) {
                Some(r) => rest = r,
                None => return false,
            }
        } else if i == fragments.len() - 1 && !pattern.ends_with('%') {
            return rest.ends_with(frag);
        } else {
            match rest.find(frag) {
                Some(pos) => rest = &rest[pos + frag.len()..],
                None => return false,
            }
        }
    }
    if !pattern.starts_with('%') && fragments.len() == 1 {
        return s == pattern;
    }
    true
}

impl Serialize for VariableValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut st = serializer.serialize_struct("VariableValue", 2)?;
        st.serialize_field("value", &self.to_json_value())?;
        st.serialize_field("type", self.type_name())?;
        st.end()
    }
}

impl<'de> Deserialize<'de> for VariableValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            value: serde_json::Value,
            #[serde(rename = "type")]
            type_name: Option<String>,
        }
        let raw = Raw::deserialize(deserializer)?;
        Self::from_parts(raw.value, raw.type_name.as_deref()).map_err(DeError::custom)
    }
}

/// A variable attached to an execution scope, as returned by the
/// variable-instance query endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableInstance {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub value: VariableValue,
    pub process_instance_id: Option<String>,
    pub execution_id: Option<String>,
    pub case_instance_id: Option<String>,
    pub case_execution_id: Option<String>,
    pub task_id: Option<String>,
    pub error_message: Option<String>,
    pub tenant_id: Option<String>,
}
