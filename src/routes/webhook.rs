// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook routes for identity provider events.

use crate::error::{AppError, Result};
use crate::models::IdentityEvent;
use crate::services::sync::NewUserAttributes;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use std::sync::Arc;

/// Webhook routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhooks/identity", post(handle_event))
}

/// Pull a required delivery header as UTF-8.
fn delivery_header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::SignatureInvalid(format!("missing {} header", name)))
}

/// Handle incoming identity events (POST).
///
/// The signature is checked against the raw body before anything is
/// parsed; a rejected delivery has no side effects. Database errors
/// surface as 500 so the provider redelivers; everything else is
/// acknowledged with 200 to stop retries.
async fn handle_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    let delivery_id = delivery_header(&headers, "delivery-id")?;
    let timestamp = delivery_header(&headers, "delivery-timestamp")?;
    let signature = delivery_header(&headers, "delivery-signature")?;

    state
        .verifier
        .verify(delivery_id, timestamp, signature, &body)?;

    let event = IdentityEvent::parse(&body).map_err(|e| {
        tracing::warn!(delivery_id, error = %e, "Failed to parse webhook event");
        AppError::BadRequest("Unparseable event payload".to_string())
    })?;

    match event {
        IdentityEvent::UserCreated(payload) => {
            tracing::info!(
                delivery_id,
                external_id = %payload.id,
                "Webhook event: user.created"
            );
            state
                .sync
                .upsert_user(NewUserAttributes::from_payload(&payload))
                .await?;
        }
        IdentityEvent::UserUpdated(payload) => {
            tracing::info!(
                delivery_id,
                external_id = %payload.id,
                "Webhook event: user.updated"
            );
            state
                .sync
                .upsert_user(NewUserAttributes::from_payload(&payload))
                .await?;
        }
        IdentityEvent::UserDeleted(payload) => {
            tracing::info!(
                delivery_id,
                external_id = %payload.id,
                "Webhook event: user.deleted"
            );
            state.deletion.delete_account_data(&payload.id).await?;
        }
        IdentityEvent::Unhandled(event_type) => {
            tracing::debug!(
                delivery_id,
                event_type = %event_type,
                "Ignoring unhandled event type"
            );
        }
    }

    // Always return 200 OK quickly so the provider does not retry.
    Ok(StatusCode::OK)
}
