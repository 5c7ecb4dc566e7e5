//! Application configuration loaded from environment variables.
//!
//! Secrets arrive as environment variables (Cloud Run secret bindings
//! inject them at startup), so there is no separate secret-fetch step.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Identity provider REST API base URL
    pub identity_api_url: String,
    /// Identity provider JWKS endpoint for session verification
    pub identity_jwks_url: String,
    /// Media store REST API base URL
    pub media_api_url: String,

    // --- Secrets (env-injected) ---
    /// Identity provider secret API key (bearer)
    pub identity_secret_key: String,
    /// Webhook signing secret (`whsec_` + base64 key)
    pub webhook_signing_secret: String,
    /// Media store API key
    pub media_api_key: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            identity_api_url: env::var("IDENTITY_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("IDENTITY_API_URL"))?,
            identity_jwks_url: env::var("IDENTITY_JWKS_URL")
                .map_err(|_| ConfigError::Missing("IDENTITY_JWKS_URL"))?,
            media_api_url: env::var("MEDIA_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("MEDIA_API_URL"))?,

            identity_secret_key: env::var("IDENTITY_SECRET_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("IDENTITY_SECRET_KEY"))?,
            webhook_signing_secret: env::var("WEBHOOK_SIGNING_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("WEBHOOK_SIGNING_SECRET"))?,
            media_api_key: env::var("MEDIA_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("MEDIA_API_KEY"))?,
        })
    }

    /// Fixed configuration for tests.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            identity_api_url: "http://localhost:9100/v1".to_string(),
            identity_jwks_url: "http://localhost:9100/.well-known/jwks.json".to_string(),
            media_api_url: "http://localhost:9200".to_string(),
            identity_secret_key: "sk_test_secret".to_string(),
            // base64 of b"test-webhook-signing-key"
            webhook_signing_secret: "whsec_dGVzdC13ZWJob29rLXNpZ25pbmcta2V5".to_string(),
            media_api_key: "media_test_key".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
