// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Yearview API Server
//!
//! Serves the aggregated calendar list for the year-at-a-glance view.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yearview::{
    config::Config,
    db::{AccountStore, FirestoreDb, MemoryAccountStore},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Yearview API");

    let store: Arc<dyn AccountStore> = if config.use_memory_store {
        tracing::warn!("Using in-memory account store; linked accounts are not persisted");
        Arc::new(MemoryAccountStore::new())
    } else {
        Arc::new(FirestoreDb::new(&config.gcp_project_id).await?)
    };

    let state = Arc::new(AppState::new(config.clone(), store));

    // Build router
    let app = yearview::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("yearview=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
