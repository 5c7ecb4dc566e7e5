// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session authentication middleware.

use crate::services::session::SessionError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Cookie the identity provider's frontend SDK sets for same-site calls.
const SESSION_COOKIE: &str = "__session";

/// Authenticated caller extracted from a verified session token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Identity provider user ID
    pub external_id: String,
}

/// Middleware that requires a valid provider session.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header {
            Some(h) if h.starts_with("Bearer ") => h[7..].to_string(),
            _ => return Err(StatusCode::UNAUTHORIZED),
        }
    };

    let session = state
        .sessions
        .verify_session_token(&token)
        .await
        .map_err(|err| match err {
            SessionError::Unauthorized(reason) => {
                tracing::warn!(reason = %reason, "Blocked request: invalid session token");
                StatusCode::UNAUTHORIZED
            }
            SessionError::Transient(reason) => {
                tracing::error!(reason = %reason, "Session verification transient failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })?;

    let auth_session = AuthSession {
        external_id: session.external_id,
    };
    request.extensions_mut().insert(auth_session);

    Ok(next.run(request).await)
}
