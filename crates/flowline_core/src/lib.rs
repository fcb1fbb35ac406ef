//! flowline_core — domain types, query model, and engine service traits.
//!
//! The REST server crate consumes the traits in [`services`] as
//! `Arc<dyn Trait>`; [`memory`] provides the in-memory reference
//! implementation used by the standalone binary and end-to-end tests.

pub mod domain;
pub mod error;
pub mod memory;
pub mod query;
pub mod services;

pub use error::{EngineError, Result};
