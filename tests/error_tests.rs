// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use scoutline::error::AppError;

#[test]
fn test_status_codes() {
    assert_eq!(
        AppError::Unauthorized.into_response().status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        AppError::InvalidToken.into_response().status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        AppError::Forbidden("Coach role required".into())
            .into_response()
            .status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        AppError::SignatureInvalid("timestamp outside tolerance".into())
            .into_response()
            .status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        AppError::MissingField("email".into()).into_response().status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        AppError::BadRequest("graduation_year out of range".into())
            .into_response()
            .status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        AppError::NotFound("user".into()).into_response().status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        AppError::Conflict("users/ext_1".into()).into_response().status(),
        StatusCode::CONFLICT
    );
    assert_eq!(
        AppError::IdentityApi("503 from provider".into())
            .into_response()
            .status(),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(
        AppError::MediaApi("timeout".into()).into_response().status(),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(
        AppError::Database("deadline exceeded".into())
            .into_response()
            .status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::Internal(anyhow::anyhow!("boom")).into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_missing_field_body_names_the_field() {
    let response = AppError::MissingField("email".into()).into_response();
    let bytes = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["error"], "missing_field");
    assert_eq!(body["details"], "email");
}

#[tokio::test]
async fn test_internal_errors_hide_details() {
    // Provider and database messages may contain URLs or document paths;
    // the response body must not echo them.
    let response = AppError::Database("users/ext_secret: deadline".into()).into_response();
    let bytes = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["error"], "database_error");
    assert!(body.get("details").is_none());
}

#[test]
fn test_conflict_predicate() {
    assert!(AppError::Conflict("users/ext_1".into()).is_conflict());
    assert!(!AppError::NotFound("user".into()).is_conflict());
    assert!(!AppError::Database("other".into()).is_conflict());
}

#[test]
fn test_not_found_predicate() {
    assert!(AppError::NotFound("profile".into()).is_not_found());
    assert!(!AppError::Conflict("users/ext_1".into()).is_not_found());
}

#[test]
fn test_display_includes_context() {
    let err = AppError::MissingField("email".into());
    assert_eq!(err.to_string(), "Missing required field: email");

    let err = AppError::Forbidden("Coach role required".into());
    assert_eq!(
        err.to_string(),
        "Insufficient permissions: Coach role required"
    );
}
