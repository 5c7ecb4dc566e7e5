// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Identity provider webhook event payloads.
//!
//! The provider delivers `{"type": "...", "data": {...}}` envelopes.
//! Parsing happens once, right after signature verification, so route
//! handlers and services only ever see the typed [`IdentityEvent`].

use serde::{Deserialize, Serialize};

/// Raw webhook envelope as delivered by the identity provider.
#[derive(Debug, Deserialize)]
struct EventEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// One email address entry in a user payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAddress {
    #[serde(default)]
    pub id: Option<String>,
    pub email_address: String,
}

/// Server-controlled provider metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicMetadata {
    #[serde(default)]
    pub role: Option<String>,
}

/// Client-writable provider metadata, set by the signup form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnsafeMetadata {
    #[serde(default, rename = "userType")]
    pub user_type: Option<String>,
}

/// The `data` object of `user.created` / `user.updated` events, and the
/// shape of a user fetched from the provider REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    pub id: String,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    pub primary_email_address_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub public_metadata: PublicMetadata,
    #[serde(default)]
    pub unsafe_metadata: UnsafeMetadata,
}

impl UserPayload {
    /// The primary email address: the entry matching
    /// `primary_email_address_id` when one exists, otherwise the first
    /// listed address.
    pub fn primary_email(&self) -> Option<String> {
        if let Some(primary_id) = &self.primary_email_address_id {
            if let Some(entry) = self
                .email_addresses
                .iter()
                .find(|e| e.id.as_ref() == Some(primary_id))
            {
                return Some(entry.email_address.clone());
            }
        }
        self.email_addresses
            .first()
            .map(|e| e.email_address.clone())
    }
}

/// The `data` object of `user.deleted` events.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDeletedPayload {
    pub id: String,
    #[serde(default)]
    pub deleted: bool,
}

/// A verified, parsed webhook event.
#[derive(Debug)]
pub enum IdentityEvent {
    UserCreated(UserPayload),
    UserUpdated(UserPayload),
    UserDeleted(UserDeletedPayload),
    /// Recognized envelope, event type we don't handle
    Unhandled(String),
}

impl IdentityEvent {
    /// Parse a verified webhook body. Fails only on a malformed
    /// envelope or a recognized type with a bad `data` shape; unknown
    /// types parse to [`IdentityEvent::Unhandled`].
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        let envelope: EventEnvelope = serde_json::from_slice(body)?;
        match envelope.event_type.as_str() {
            "user.created" => Ok(IdentityEvent::UserCreated(serde_json::from_value(
                envelope.data,
            )?)),
            "user.updated" => Ok(IdentityEvent::UserUpdated(serde_json::from_value(
                envelope.data,
            )?)),
            "user.deleted" => Ok(IdentityEvent::UserDeleted(serde_json::from_value(
                envelope.data,
            )?)),
            _ => Ok(IdentityEvent::Unhandled(envelope.event_type)),
        }
    }
}
