// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scoutline API Server
//!
//! Mirrors identity provider accounts into Firestore and cascades
//! account deletion across recruiting profiles, shortlists and notes.

use scoutline::{
    config::Config,
    db::FirestoreDb,
    services::{
        DeletionService, IdentityClient, MediaClient, SessionVerifier, SyncService,
        WebhookVerifier,
    },
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
    tracing::info!(port = config.port, "Starting Scoutline API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Outbound clients
    let identity = IdentityClient::new(
        config.identity_api_url.clone(),
        config.identity_secret_key.clone(),
    );
    let media = MediaClient::new(config.media_api_url.clone(), config.media_api_key.clone());

    // Webhook signature verification
    let verifier = WebhookVerifier::new(&config.webhook_signing_secret)
        .expect("Failed to initialize webhook verifier");

    // Session verification against the provider's JWKS
    let sessions =
        Arc::new(SessionVerifier::new(&config).expect("Failed to initialize session verifier"));

    // Domain services
    let sync = SyncService::new(db.clone(), identity.clone());
    let deletion = DeletionService::new(db.clone(), media.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        identity,
        media,
        verifier,
        sessions,
        sync,
        deletion,
    });

    // Build router
    let app = scoutline::routes::create_router(state);

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
                .add_directive("scoutline=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
