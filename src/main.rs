// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout Atlas API Server
//!
//! Serves the workout session controller to a map frontend and persists
//! the workout list on local disk.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workout_atlas::{
    config::Config,
    db::FileStore,
    services::{event_loop, GoogleGeocoder, SessionController, ViewRenderer, WorkoutRepository},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Workout Atlas API");

    if config.geocoding_api_key.is_none() {
        tracing::warn!("GEOCODING_API_KEY not set, place names will be unknown");
    }

    // Open the snapshot store and load saved workouts
    let store = FileStore::open(&config.data_dir)?;
    let controller = SessionController::new(WorkoutRepository::new(store), ViewRenderer::new())
        .with_zoom(config.map_zoom);

    let geocoder = GoogleGeocoder::new(
        config.geocoding_api_key.clone(),
        config.geocoding_url.clone(),
    )?;

    let (session, _session_loop) = event_loop::spawn(controller, geocoder);
    tracing::info!("Session loop initialized");

    // A configured position stands in for asking the browser
    if let Some(position) = config.initial_position {
        session.report_position(Ok(position)).await?;
    }

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        session,
    });

    // Build router
    let app = workout_atlas::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

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

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("workout_atlas=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
