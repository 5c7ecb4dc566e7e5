// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider REST API client.
//!
//! Handles:
//! - User lookup (for the request-path bootstrap)
//! - Role metadata write-back (keeps provider metadata authoritative)
//! - Account deletion (the provider's `user.deleted` webhook then drives
//!   local cleanup)

use crate::error::AppError;
use crate::models::event::UserPayload;
use crate::models::Role;
use serde::Deserialize;

/// Identity provider API client.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl IdentityClient {
    /// Create a new client with the instance base URL and secret key.
    pub fn new(base_url: String, secret_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            secret_key,
        }
    }

    /// Fetch the current identity record for a user.
    pub async fn get_user(&self, external_id: &str) -> Result<UserPayload, AppError> {
        let url = format!("{}/users/{}", self.base_url, external_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| AppError::IdentityApi(e.to_string()))?;

        self.check_response_json(response, external_id).await
    }

    /// Merge the resolved role into the user's public metadata.
    ///
    /// The provider treats metadata PATCH as a deep merge, so this only
    /// touches the `role` key.
    pub async fn update_role_metadata(
        &self,
        external_id: &str,
        role: Role,
    ) -> Result<(), AppError> {
        let url = format!("{}/users/{}/metadata", self.base_url, external_id);

        let body = serde_json::json!({
            "public_metadata": { "role": role.as_str() }
        });

        let response = self
            .http
            .patch(&url)
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::IdentityApi(e.to_string()))?;

        self.check_response(response, external_id).await?;
        Ok(())
    }

    /// Delete the user's account at the provider.
    ///
    /// A 404 means the account is already gone, which is the outcome we
    /// wanted.
    pub async fn delete_user(&self, external_id: &str) -> Result<(), AppError> {
        let url = format!("{}/users/{}", self.base_url, external_id);
        let response = self
            .http
            .delete(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| AppError::IdentityApi(e.to_string()))?;

        if response.status().as_u16() == 404 {
            tracing::info!(external_id, "Account already deleted at provider");
            return Ok(());
        }

        self.check_response(response, external_id).await?;
        tracing::info!(external_id, "Account deletion requested at provider");
        Ok(())
    }

    /// Check response status and return error if not successful.
    async fn check_response(
        &self,
        response: reqwest::Response,
        external_id: &str,
    ) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 404 {
            return Err(AppError::NotFound(format!("identity {}", external_id)));
        }

        if status.as_u16() == 401 {
            return Err(AppError::IdentityApi("secret key rejected".to_string()));
        }

        Err(AppError::IdentityApi(format!("HTTP {}: {}", status, body)))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
        external_id: &str,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 404 {
                return Err(AppError::NotFound(format!("identity {}", external_id)));
            }

            if status.as_u16() == 401 {
                return Err(AppError::IdentityApi("secret key rejected".to_string()));
            }

            return Err(AppError::IdentityApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::IdentityApi(format!("JSON parse error: {}", e)))
    }
}
