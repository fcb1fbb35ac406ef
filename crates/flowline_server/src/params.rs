//! Query-string binding shared by every query endpoint.
//!
//! The rules here are the cross-cutting half of the REST contract: pagination
//! defaults, the both-or-neither `sortBy`/`sortOrder` pair, comma-separated
//! multi-value parameters, and `KEY_OPERATOR_VALUE` variable expressions.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use chrono::{DateTime, NaiveDateTime, Utc};
use flowline_core::domain::VariableValue;
use flowline_core::query::{Comparator, Pagination, SortOrder, Sorting, VariableFilter};
use flowline_core::EngineError;

use crate::error::AppError;

/// JSON body extractor whose rejection carries the standard error envelope.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::invalid(rejection.body_text())),
        }
    }
}

/// Raw query-string map with the typed accessors the resource modules bind
/// their filter parameters through.
#[derive(Debug, Default)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    pub fn new(params: HashMap<String, String>) -> Self {
        Self(params)
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    /// Comma-separated multi-value parameter, split into a list.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        self.0
            .get(key)
            .map(|raw| raw.split(',').map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Boolean flag; absent means false.
    pub fn flag(&self, key: &str) -> Result<bool, EngineError> {
        match self.0.get(key).map(String::as_str) {
            None => Ok(false),
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(other) => Err(invalid_value(key, other)),
        }
    }

    pub fn number<T: FromStr>(&self, key: &str) -> Result<Option<T>, EngineError> {
        match self.0.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| invalid_value(key, raw)),
        }
    }

    /// RFC3339 date, with the original's timezone-less format accepted as UTC.
    pub fn date(&self, key: &str) -> Result<Option<DateTime<Utc>>, EngineError> {
        match self.0.get(key) {
            None => Ok(None),
            Some(raw) => parse_date(raw).map(Some).ok_or_else(|| invalid_value(key, raw)),
        }
    }

    /// `name_operator_value(,name_operator_value)*` variable expressions.
    pub fn variable_filters(&self, key: &str) -> Result<Vec<VariableFilter>, EngineError> {
        match self.0.get(key) {
            None => Ok(Vec::new()),
            Some(raw) => raw.split(',').map(parse_variable_expression).collect(),
        }
    }

    /// The `sortBy`/`sortOrder` pair: both present, both absent, or a 400.
    pub fn sorting<K>(&self, parse_key: fn(&str) -> Option<K>) -> Result<Vec<Sorting<K>>, EngineError> {
        let sort_by = self.0.get("sortBy");
        let sort_order = self.0.get("sortOrder");
        match (sort_by, sort_order) {
            (None, None) => Ok(Vec::new()),
            (Some(by), Some(order)) => {
                let sort_by =
                    parse_key(by).ok_or_else(|| invalid_value("sortBy", by))?;
                let sort_order = SortOrder::from_param(order)
                    .ok_or_else(|| invalid_value("sortOrder", order))?;
                Ok(vec![Sorting::new(sort_by, sort_order)])
            }
            _ => Err(EngineError::invalid(
                "Only a single sorting parameter specified. sortBy and sortOrder required",
            )),
        }
    }

    /// `firstResult` / `maxResults`, defaulting to 0 / no limit.
    pub fn pagination(&self) -> Result<Pagination, EngineError> {
        let first_result = self.number("firstResult")?.unwrap_or(0);
        let max_results = self.number("maxResults")?.unwrap_or(usize::MAX);
        Ok(Pagination::window(first_result, max_results))
    }
}

fn invalid_value(key: &str, value: &str) -> EngineError {
    EngineError::invalid(format!("Cannot set query parameter '{key}' to value '{value}'"))
}

pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = raw.parse::<DateTime<Utc>>() {
        return Some(date);
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn parse_variable_expression(expr: &str) -> Result<VariableFilter, EngineError> {
    let mut parts = expr.splitn(3, '_');
    let (Some(name), Some(op), Some(value)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(EngineError::invalid(
            "variable query parameter has to have format KEY_OPERATOR_VALUE",
        ));
    };
    let operator = Comparator::from_str(op)
        .ok_or_else(|| EngineError::invalid(format!("Invalid variable comparator specified: {op}")))?;
    Ok(VariableFilter::new(name, operator, condition_value(value)))
}

/// Expression values are untyped text; take the narrowest type that parses.
fn condition_value(raw: &str) -> VariableValue {
    if let Ok(i) = raw.parse::<i64>() {
        return VariableValue::Integer(i);
    }
    if let Ok(d) = raw.parse::<f64>() {
        return VariableValue::Double(d);
    }
    match raw {
        "true" => VariableValue::Boolean(true),
        "false" => VariableValue::Boolean(false),
        _ => VariableValue::String(raw.to_string()),
    }
}
