//! REST layer for the flowline engine.
//!
//! Thin axum handlers over the `flowline_core` service traits: bind query
//! parameters and bodies, call the service, map [`flowline_core::EngineError`]
//! to the `{"type", "message"}` error envelope.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod params;
pub mod router;
