// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider session-token verification.
//!
//! Browser sessions are RS256 JWTs minted by the identity provider and
//! verified against the instance's JWKS endpoint. Keys are cached by
//! `kid`; an unknown `kid` forces one refresh so key rotation doesn't
//! lock users out for the cache TTL.

use crate::config::Config;
use anyhow::Context;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, RwLock};

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
const CLOCK_SKEW_SECS: u64 = 60;

/// Verified session extracted from a valid token.
#[derive(Debug, Clone)]
pub struct VerifiedSession {
    /// Identity provider user ID (`sub`)
    pub external_id: String,
    /// Provider session ID, when the token carries one
    pub session_id: Option<String>,
}

/// Session verification error categories.
#[derive(Debug, Clone)]
pub enum SessionError {
    /// The token is missing/invalid or claims do not match expectations.
    Unauthorized(String),
    /// A transient infrastructure failure occurred (JWKS unreachable).
    Transient(String),
}

#[derive(Clone)]
enum VerifierMode {
    Jwks,
    StaticKey {
        kid: String,
        decoding_key: Arc<DecodingKey>,
    },
}

#[derive(Clone)]
struct JwksCacheEntry {
    keys_by_kid: HashMap<String, Arc<DecodingKey>>,
    expires_at: Instant,
}

/// Verifier for provider-issued session tokens.
pub struct SessionVerifier {
    http_client: reqwest::Client,
    jwks_url: String,
    expected_issuer: String,
    authorized_party: String,
    mode: VerifierMode,
    jwks_cache: RwLock<Option<JwksCacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl SessionVerifier {
    /// Create a production verifier that fetches and caches JWKS keys.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building session HTTP client")?;

        let expected_issuer = issuer_from_jwks_url(&config.identity_jwks_url);

        tracing::info!(
            jwks_url = %config.identity_jwks_url,
            expected_issuer = %expected_issuer,
            "Initialized session verifier"
        );

        Ok(Self {
            http_client,
            jwks_url: config.identity_jwks_url.clone(),
            expected_issuer,
            authorized_party: config.frontend_url.trim_end_matches('/').to_string(),
            mode: VerifierMode::Jwks,
            jwks_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Create a verifier with a static RSA public key.
    ///
    /// This is intended for deterministic local/integration tests.
    pub fn new_with_static_key(
        config: &Config,
        kid: impl Into<String>,
        decoding_key: DecodingKey,
    ) -> anyhow::Result<Self> {
        let kid = kid.into();
        if kid.trim().is_empty() {
            anyhow::bail!("static session kid must not be empty");
        }

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building session HTTP client")?;

        let expected_issuer = issuer_from_jwks_url(&config.identity_jwks_url);

        Ok(Self {
            http_client,
            jwks_url: config.identity_jwks_url.clone(),
            expected_issuer,
            authorized_party: config.frontend_url.trim_end_matches('/').to_string(),
            mode: VerifierMode::StaticKey {
                kid,
                decoding_key: Arc::new(decoding_key),
            },
            jwks_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Verify a session token and extract the caller's identity.
    pub async fn verify_session_token(&self, token: &str) -> Result<VerifiedSession, SessionError> {
        if token.is_empty() {
            return Err(SessionError::Unauthorized(
                "session token is empty".to_string(),
            ));
        }

        let header = decode_header(token)
            .map_err(|e| SessionError::Unauthorized(format!("invalid JWT header: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(SessionError::Unauthorized(format!(
                "unexpected JWT alg: {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| SessionError::Unauthorized("missing JWT kid".to_string()))?;

        let decoding_key = self.decoding_key_for_kid(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.set_issuer(&[self.expected_issuer.as_str()]);
        // Session tokens carry no audience claim.
        validation.validate_aud = false;
        validation.validate_nbf = true;
        validation.leeway = CLOCK_SKEW_SECS;

        let token_data = decode::<SessionClaims>(token, decoding_key.as_ref(), &validation)
            .map_err(|e| SessionError::Unauthorized(format!("JWT validation failed: {e}")))?;

        let claims = token_data.claims;

        validate_iat(claims.iat)?;

        if let Some(azp) = &claims.azp {
            if azp.trim_end_matches('/') != self.authorized_party {
                return Err(SessionError::Unauthorized(format!(
                    "unexpected authorized party: {azp}"
                )));
            }
        }

        Ok(VerifiedSession {
            external_id: claims.sub,
            session_id: claims.sid,
        })
    }

    async fn decoding_key_for_kid(&self, kid: &str) -> Result<Arc<DecodingKey>, SessionError> {
        match &self.mode {
            VerifierMode::StaticKey {
                kid: static_kid,
                decoding_key,
            } => {
                if kid == static_kid {
                    return Ok(decoding_key.clone());
                }

                return Err(SessionError::Unauthorized(format!(
                    "unknown JWT kid for static verifier: {kid}"
                )));
            }
            VerifierMode::Jwks => {}
        }

        if let Some(key) = self.lookup_cached_key(kid).await {
            return Ok(key);
        }

        for force_refresh in [false, true] {
            self.refresh_jwks(force_refresh).await?;
            if let Some(key) = self.lookup_cached_key(kid).await {
                return Ok(key);
            }
        }

        Err(SessionError::Unauthorized(format!(
            "JWT kid not found in JWKS after refresh: {kid}"
        )))
    }

    async fn lookup_cached_key(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        let cache = self.jwks_cache.read().await;
        let now = Instant::now();
        cache
            .as_ref()
            .filter(|entry| entry.expires_at > now)
            .and_then(|entry| entry.keys_by_kid.get(kid))
            .cloned()
    }

    async fn refresh_jwks(&self, force_refresh: bool) -> Result<(), SessionError> {
        let _guard = self.refresh_lock.lock().await;

        if !force_refresh {
            let cache = self.jwks_cache.read().await;
            if cache
                .as_ref()
                .is_some_and(|entry| entry.expires_at > Instant::now())
            {
                return Ok(());
            }
        }

        tracing::debug!(jwks_url = %self.jwks_url, "Refreshing JWKS cache");

        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| SessionError::Transient(format!("JWKS request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(SessionError::Transient(format!(
                "JWKS request returned status {}",
                response.status()
            )));
        }

        let ttl = cache_ttl_from_headers(response.headers(), DEFAULT_CACHE_TTL);

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| SessionError::Transient(format!("invalid JWKS JSON: {e}")))?;

        let mut keys_by_kid: HashMap<String, Arc<DecodingKey>> = HashMap::new();

        for jwk in jwks.keys {
            if jwk.kty != "RSA" {
                continue;
            }

            if jwk.kid.trim().is_empty() {
                continue;
            }

            if let Some(alg) = &jwk.alg {
                if alg != "RS256" {
                    continue;
                }
            }

            if let Some(use_) = &jwk.use_ {
                if use_ != "sig" {
                    continue;
                }
            }

            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    keys_by_kid.insert(jwk.kid, Arc::new(key));
                }
                Err(e) => {
                    tracing::warn!(error = %e, kid = %jwk.kid, "Skipping invalid RSA JWKS key");
                }
            }
        }

        if keys_by_kid.is_empty() {
            return Err(SessionError::Transient(
                "JWKS response did not include any usable RSA keys".to_string(),
            ));
        }

        let entry = JwksCacheEntry {
            keys_by_kid,
            expires_at: Instant::now() + ttl,
        };

        *self.jwks_cache.write().await = Some(entry);

        tracing::debug!(ttl_secs = ttl.as_secs(), "JWKS cache refreshed");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    alg: Option<String>,
    n: String,
    e: String,
    #[serde(rename = "use")]
    use_: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
    #[allow(dead_code)]
    iss: String,
    #[allow(dead_code)]
    exp: usize,
    iat: Option<usize>,
    /// Origin the token was minted for
    azp: Option<String>,
    /// Provider session ID
    sid: Option<String>,
}

fn validate_iat(iat: Option<usize>) -> Result<(), SessionError> {
    let now = now_unix_secs();

    let Some(iat) = iat else {
        return Err(SessionError::Unauthorized("missing iat claim".to_string()));
    };

    if iat as u64 > now + CLOCK_SKEW_SECS {
        return Err(SessionError::Unauthorized(
            "iat claim is in the future".to_string(),
        ));
    }

    Ok(())
}

fn cache_ttl_from_headers(headers: &reqwest::header::HeaderMap, fallback: Duration) -> Duration {
    let Some(cache_control) = headers
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_cache_control_max_age)
    else {
        return fallback;
    };

    Duration::from_secs(cache_control)
}

fn parse_cache_control_max_age(value: &str) -> Option<u64> {
    for directive in value.split(',') {
        let directive = directive.trim();

        if let Some(raw) = directive.strip_prefix("max-age=") {
            let raw = raw.trim_matches('"');
            if let Ok(seconds) = raw.parse::<u64>() {
                return Some(seconds);
            }
        }
    }

    None
}

/// The provider serves JWKS under `/.well-known/`, and tokens are issued
/// by the same origin.
fn issuer_from_jwks_url(jwks_url: &str) -> String {
    match jwks_url.split_once("/.well-known") {
        Some((origin, _)) => origin.to_string(),
        None => jwks_url.trim_end_matches('/').to_string(),
    }
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
