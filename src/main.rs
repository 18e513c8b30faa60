// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Segment-PR Server
//!
//! Authenticates with Strava and compares an activity's segment efforts
//! with the athlete's personal records.

use segment_pr::{browser, config::Config, services::StravaClient, AppState};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often idle sessions are purged.
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from file and environment
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        port = config.port,
        callback_url = %config.callback_url(),
        "Starting Segment-PR"
    );

    // Initialize Strava client
    let strava = StravaClient::new(
        config.client_id.to_string(),
        config.client_secret.clone(),
        config.http_timeout(),
    )?;
    tracing::info!(
        timeout_secs = config.http_timeout_secs,
        "Strava client initialized"
    );

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), Arc::new(strava)));

    // Drop idle sessions in the background
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let removed = sessions.purge_expired();
            if removed > 0 {
                tracing::info!(removed, "Purged idle sessions");
            }
        }
    });

    // Build router
    let app = segment_pr::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    if config.open_browser {
        browser::open(&format!("{}/", config.base_url()));
    }

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("segment_pr=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
