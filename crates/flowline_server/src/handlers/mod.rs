//! One module per REST resource. Handlers stay thin: bind parameters, call
//! the service trait, map the result — all error shaping happens in
//! [`crate::error`].

use serde::{Deserialize, Serialize};

pub mod case_execution;
pub mod filter;
pub mod history;
pub mod identity;
pub mod incident;
pub mod job;
pub mod job_definition;
pub mod message;
pub mod process_instance;
pub mod task;
pub mod variable_instance;

/// Body of every `/count` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResult {
    pub count: u64,
}

/// One entry of an OPTIONS `links` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub method: String,
    pub href: String,
    pub rel: String,
}

impl Link {
    pub fn new(method: &str, href: impl Into<String>, rel: &str) -> Self {
        Self {
            method: method.to_string(),
            href: href.into(),
            rel: rel.to_string(),
        }
    }
}

/// Body of an OPTIONS response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceOptions {
    pub links: Vec<Link>,
}
