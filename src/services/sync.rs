// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User reconciliation between the identity provider and Firestore.
//!
//! Handles:
//! - Idempotent upsert from `user.created` / `user.updated` events
//! - Role resolution from provider metadata with signup-hint fallback
//! - Request-path bootstrap for users whose events haven't arrived yet
//! - Creation-race absorption (webhook vs. bootstrap)

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::event::UserPayload;
use crate::models::{InternalUser, Role};
use crate::services::identity::IdentityClient;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Normalized user attributes, built from either a webhook payload or a
/// provider API lookup so both paths share one upsert.
#[derive(Debug, Clone)]
pub struct NewUserAttributes {
    pub external_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `public_metadata.role`, verbatim
    pub metadata_role: Option<String>,
    /// `unsafe_metadata.userType`, set by the signup form
    pub signup_user_type: Option<String>,
}

impl NewUserAttributes {
    pub fn from_payload(payload: &UserPayload) -> Self {
        Self {
            external_id: payload.id.clone(),
            email: payload.primary_email().filter(|e| !e.is_empty()),
            first_name: payload.first_name.clone(),
            last_name: payload.last_name.clone(),
            metadata_role: payload.public_metadata.role.clone(),
            signup_user_type: payload.unsafe_metadata.user_type.clone(),
        }
    }
}

/// Resolve the role for a user, first match wins:
/// 1. a valid `public_metadata.role` (set by an admin or a previous sync)
/// 2. the signup form's `userType`, if it names player or coach
/// 3. player
pub fn resolve_role(attrs: &NewUserAttributes) -> Role {
    if let Some(role) = attrs.metadata_role.as_deref().and_then(Role::parse) {
        return role;
    }

    match attrs.signup_user_type.as_deref() {
        Some("player") => Role::Player,
        Some("coach") => Role::Coach,
        _ => Role::Player,
    }
}

/// Reconciliation service over the user collection.
#[derive(Clone)]
pub struct SyncService {
    db: FirestoreDb,
    identity: IdentityClient,
}

impl SyncService {
    pub fn new(db: FirestoreDb, identity: IdentityClient) -> Self {
        Self { db, identity }
    }

    /// Create or update the internal user for these attributes.
    ///
    /// Safe to call repeatedly with the same payload (duplicate webhook
    /// deliveries land on the update path and rewrite the same values),
    /// and safe to race: concurrent creation is arbitrated by the user
    /// document ID, with losers re-reading the winner's row.
    pub async fn upsert_user(&self, attrs: NewUserAttributes) -> Result<InternalUser, AppError> {
        let resolved_role = resolve_role(&attrs);

        match self.db.get_user_by_external_id(&attrs.external_id).await? {
            Some(existing) => {
                self.update_existing(existing, &attrs, resolved_role)
                    .await
            }
            None => self.create_new(&attrs, resolved_role).await,
        }
    }

    /// Guarantee an internal user exists for this external ID.
    ///
    /// Fast path is a single read; when the row is missing (the user's
    /// creation event hasn't arrived or was lost) the current identity
    /// is fetched from the provider and run through the normal upsert.
    pub async fn ensure_user(&self, external_id: &str) -> Result<InternalUser, AppError> {
        if let Some(user) = self.db.get_user_by_external_id(external_id).await? {
            return Ok(user);
        }

        tracing::info!(external_id, "No internal user yet, bootstrapping from provider");

        let payload = self.identity.get_user(external_id).await?;
        self.upsert_user(NewUserAttributes::from_payload(&payload))
            .await
    }

    async fn update_existing(
        &self,
        mut user: InternalUser,
        attrs: &NewUserAttributes,
        resolved_role: Role,
    ) -> Result<InternalUser, AppError> {
        // Keep provider metadata authoritative before mirroring it.
        self.write_back_role(attrs, resolved_role).await;

        if let Some(email) = &attrs.email {
            user.email = email.clone();
        }
        user.first_name = attrs.first_name.clone();
        user.last_name = attrs.last_name.clone();
        user.roles = vec![resolved_role];
        user.updated_at = chrono::Utc::now().to_rfc3339();

        self.db.update_user(&user).await?;

        tracing::info!(
            external_id = %user.external_id,
            role = resolved_role.as_str(),
            "User synced (update)"
        );

        Ok(user)
    }

    async fn create_new(
        &self,
        attrs: &NewUserAttributes,
        resolved_role: Role,
    ) -> Result<InternalUser, AppError> {
        // Creation is the one place a missing email is fatal: the store
        // requires one and there is nothing to fall back to.
        let email = attrs
            .email
            .clone()
            .ok_or_else(|| AppError::MissingField("email".to_string()))?;

        self.write_back_role(attrs, resolved_role).await;

        let now = chrono::Utc::now().to_rfc3339();
        let user = InternalUser {
            id: uuid::Uuid::new_v4().to_string(),
            external_id: attrs.external_id.clone(),
            email,
            first_name: attrs.first_name.clone(),
            last_name: attrs.last_name.clone(),
            roles: vec![resolved_role],
            password: generate_placeholder_secret()?,
            stripe_customer_id: None,
            subscription_status: None,
            created_at: now.clone(),
            updated_at: now,
        };

        match self.db.create_user(&user).await {
            Ok(()) => {
                tracing::info!(
                    external_id = %user.external_id,
                    role = resolved_role.as_str(),
                    "User created"
                );
                Ok(user)
            }
            Err(e) if e.is_conflict() => {
                // Another writer (webhook vs. bootstrap) created the row
                // between our read and our insert. Their row wins.
                tracing::info!(
                    external_id = %attrs.external_id,
                    "Creation race absorbed, using existing user"
                );
                self.db
                    .get_user_by_external_id(&attrs.external_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Database(format!(
                            "user {} vanished after creation conflict",
                            attrs.external_id
                        ))
                    })
            }
            Err(e) => Err(e),
        }
    }

    /// Best-effort write of the resolved role back to provider metadata.
    ///
    /// Skipped when the metadata already carries the resolved role, so a
    /// sync triggered by our own metadata write doesn't write again.
    async fn write_back_role(&self, attrs: &NewUserAttributes, resolved_role: Role) {
        if attrs.metadata_role.as_deref() == Some(resolved_role.as_str()) {
            return;
        }

        if let Err(e) = self
            .identity
            .update_role_metadata(&attrs.external_id, resolved_role)
            .await
        {
            tracing::warn!(
                external_id = %attrs.external_id,
                error = %e,
                "Role metadata write-back failed, continuing"
            );
        }
    }
}

/// Random secret for the never-used password column.
fn generate_placeholder_secret() -> Result<String, AppError> {
    use ring::rand::SecureRandom;

    let rng = ring::rand::SystemRandom::new();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("system RNG failure")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
