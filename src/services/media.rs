// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Media (blob) store client.
//!
//! Profile images live in an external blob store; the stored
//! `profile_image_url` is the only reference we keep. Deletion derives
//! the provider file key from the URL's last path segment.

use crate::error::AppError;

/// Media store API client.
#[derive(Clone)]
pub struct MediaClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MediaClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// Delete the blob a public URL points at.
    ///
    /// A 404 means the blob is already gone and counts as success;
    /// callers treat any other failure as non-critical and log it.
    pub async fn delete_by_url(&self, url: &str) -> Result<(), AppError> {
        let key = file_key_from_url(url)
            .ok_or_else(|| AppError::MediaApi(format!("no file key in URL: {}", url)))?;

        let endpoint = format!("{}/files/{}", self.base_url, urlencoding::encode(&key));
        let response = self
            .http
            .delete(&endpoint)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AppError::MediaApi(e.to_string()))?;

        if response.status().as_u16() == 404 {
            tracing::debug!(key = %key, "Media object already gone");
            return Ok(());
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::MediaApi(format!("HTTP {}: {}", status, body)));
        }

        tracing::debug!(key = %key, "Media object deleted");
        Ok(())
    }
}

/// Extract the percent-decoded file key (last path segment) from a URL.
fn file_key_from_url(url: &str) -> Option<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    // Strip the scheme so a bare host never reads as a file key
    let after_scheme = without_query
        .split_once("://")
        .map_or(without_query, |(_, rest)| rest);
    let (_, path) = after_scheme.split_once('/')?;
    let segment = path.trim_end_matches('/').rsplit('/').next()?;
    if segment.is_empty() || segment.contains(':') {
        return None;
    }
    urlencoding::decode(segment).ok().map(|s| s.into_owned())
}
