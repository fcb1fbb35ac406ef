//! flowline_server — standalone REST server for the flowline engine.
//!
//! Reads config from env vars:
//!   FLOWLINE_BIND_ADDR — listen address (default: 0.0.0.0:4200)

use std::sync::Arc;

use flowline_core::memory::MemoryEngine;
use flowline_server::router::router_with_engine;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,flowline_server=debug".into()),
        )
        .init();

    let bind_addr = std::env::var("FLOWLINE_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:4200".into());

    let engine = Arc::new(MemoryEngine::new());
    let app = router_with_engine(engine);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {bind_addr}: {e}"));
    tracing::info!("flowline_server listening on {bind_addr}");

    axum::serve(listener, app).await.expect("server error");
}
