// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Neko-Tracker API Server
//!
//! Tracks cat weight records with shared editing, public share links, and
//! an AI health analysis backed by Gemini.

use neko_tracker::{
    config::Config,
    db::FirestoreDb,
    services::{GeminiClient, GoogleIdentityVerifier},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Neko-Tracker API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Initialize Google sign-in verification
    let identity_verifier =
        Arc::new(GoogleIdentityVerifier::new(&config).expect("Failed to initialize verifier"));

    // Initialize the Gemini client; a missing key is reported per call so
    // the rest of the app keeps working without it
    let gemini = GeminiClient::new(config.gemini_api_key.clone());
    if !gemini.has_api_key() {
        tracing::warn!("GEMINI_API_KEY not set; weight analysis will be unavailable");
    }

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        identity_verifier,
        gemini,
    });

    // Build router
    let app = neko_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("neko_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
