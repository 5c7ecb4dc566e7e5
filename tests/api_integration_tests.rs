// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end API tests over the full router.
//!
//! These tests require the Firestore emulator to be running.
//! Run with: ./scripts/test-with-emulator.sh --test api_integration_tests
//!
//! Users are seeded directly so the handlers' bootstrap fast path never
//! calls out to the identity provider.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use scoutline::config::Config;
use scoutline::models::{InternalUser, Role};
use scoutline::AppState;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

/// Generate a unique external ID for test isolation.
fn unique_external_id(tag: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("ext_{}_{}", tag, nanos)
}

fn test_user(external_id: &str, role: Role) -> InternalUser {
    let now = chrono::Utc::now().to_rfc3339();
    InternalUser {
        id: uuid::Uuid::new_v4().to_string(),
        external_id: external_id.to_string(),
        email: format!("{}@example.com", external_id),
        first_name: Some("Api".to_string()),
        last_name: Some("Tester".to_string()),
        roles: vec![role],
        password: "placeholder".to_string(),
        stripe_customer_id: None,
        subscription_status: None,
        created_at: now.clone(),
        updated_at: now,
    }
}

async fn emulator_app() -> (axum::Router, Arc<AppState>) {
    let state = common::test_state(Config::test_default(), common::test_db().await);
    (scoutline::routes::create_router(state.clone()), state)
}

/// Send an authenticated request, optionally with a JSON body.
async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> axum::response::Response {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_me_returns_seeded_user() {
    require_emulator!();
    let (app, state) = emulator_app().await;

    let user = test_user(&unique_external_id("me"), Role::Player);
    state.db.create_user(&user).await.unwrap();
    let token = common::create_session_token(&user.external_id);

    let response = send(&app, "GET", "/api/me", &token, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["id"], user.id.as_str());
    assert_eq!(body["external_id"], user.external_id.as_str());
    assert_eq!(body["email"], user.email.as_str());
    assert_eq!(body["roles"], json!(["player"]));
}

#[tokio::test]
async fn test_player_profile_partial_updates_accumulate() {
    require_emulator!();
    let (app, state) = emulator_app().await;

    let user = test_user(&unique_external_id("profile"), Role::Player);
    state.db.create_user(&user).await.unwrap();
    let token = common::create_session_token(&user.external_id);

    let response = send(
        &app,
        "PUT",
        "/api/profile/player",
        &token,
        Some(json!({"position": "goalkeeper", "graduation_year": 2027})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // A second partial update must not clear earlier fields
    let response = send(
        &app,
        "PUT",
        "/api/profile/player",
        &token,
        Some(json!({"club": "Northside Rovers"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let profile = state
        .db
        .get_player_profile(&user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.position.as_deref(), Some("goalkeeper"));
    assert_eq!(profile.graduation_year, Some(2027));
    assert_eq!(profile.club.as_deref(), Some("Northside Rovers"));
}

#[tokio::test]
async fn test_coach_endpoint_requires_coach_role() {
    require_emulator!();
    let (app, state) = emulator_app().await;

    let user = test_user(&unique_external_id("rolegate"), Role::Player);
    state.db.create_user(&user).await.unwrap();
    let token = common::create_session_token(&user.external_id);

    let response = send(
        &app,
        "PUT",
        "/api/profile/coach",
        &token,
        Some(json!({"organization": "State University"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_player_endpoint_requires_player_role() {
    require_emulator!();
    let (app, state) = emulator_app().await;

    let user = test_user(&unique_external_id("rolegate2"), Role::Coach);
    state.db.create_user(&user).await.unwrap();
    let token = common::create_session_token(&user.external_id);

    let response = send(
        &app,
        "PUT",
        "/api/profile/player",
        &token,
        Some(json!({"position": "striker"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_save_and_unsave_player() {
    require_emulator!();
    let (app, state) = emulator_app().await;

    let coach = test_user(&unique_external_id("savec"), Role::Coach);
    let player = test_user(&unique_external_id("savep"), Role::Player);
    state.db.create_user(&coach).await.unwrap();
    state.db.create_user(&player).await.unwrap();
    let token = common::create_session_token(&coach.external_id);

    let uri = format!("/api/saved-players/{}", player.id);

    let response = send(&app, "PUT", &uri, &token, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let first = json_body(response).await;
    assert_eq!(first["player_user_id"], player.id.as_str());

    // Saving twice keeps the original link (and its timestamp)
    let response = send(&app, "PUT", &uri, &token, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = json_body(response).await;
    assert_eq!(second["saved_at"], first["saved_at"]);

    let response = send(&app, "DELETE", &uri, &token, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(state
        .db
        .get_saved_player(&coach.id, &player.id)
        .await
        .unwrap()
        .is_none());

    // Unsaving an absent link stays a 204: the delete is retry-safe
    let response = send(&app, "DELETE", &uri, &token, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_save_unknown_player_is_not_found() {
    require_emulator!();
    let (app, state) = emulator_app().await;

    let coach = test_user(&unique_external_id("save404"), Role::Coach);
    state.db.create_user(&coach).await.unwrap();
    let token = common::create_session_token(&coach.external_id);

    let response = send(&app, "PUT", "/api/saved-players/no-such-id", &token, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_saving_a_coach_reads_as_not_found() {
    require_emulator!();
    let (app, state) = emulator_app().await;

    // Target exists but has no player role; the response must not
    // reveal the difference.
    let coach = test_user(&unique_external_id("savec2"), Role::Coach);
    let other = test_user(&unique_external_id("savec3"), Role::Coach);
    state.db.create_user(&coach).await.unwrap();
    state.db.create_user(&other).await.unwrap();
    let token = common::create_session_token(&coach.external_id);

    let uri = format!("/api/saved-players/{}", other.id);
    let response = send(&app, "PUT", &uri, &token, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_note_upsert_preserves_created_at() {
    require_emulator!();
    let (app, state) = emulator_app().await;

    let coach = test_user(&unique_external_id("notec"), Role::Coach);
    let player = test_user(&unique_external_id("notep"), Role::Player);
    state.db.create_user(&coach).await.unwrap();
    state.db.create_user(&player).await.unwrap();
    let token = common::create_session_token(&coach.external_id);

    let uri = format!("/api/notes/{}", player.id);

    let response = send(
        &app,
        "PUT",
        &uri,
        &token,
        Some(json!({
            "notes": "strong in the air",
            "interest_level": "high",
            "contacts": [{
                "occurred_at": "2026-02-11T16:00:00Z",
                "method": "campus visit",
                "summary": "met with parents"
            }]
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let first = json_body(response).await;
    assert_eq!(first["interest_level"], "high");
    assert_eq!(first["contacts"][0]["method"], "campus visit");

    let response = send(
        &app,
        "PUT",
        &uri,
        &token,
        Some(json!({
            "notes": "committed elsewhere",
            "interest_level": "low",
            "contacts": []
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = json_body(response).await;

    assert_eq!(second["created_at"], first["created_at"]);
    assert_eq!(second["notes"], "committed elsewhere");
    assert_eq!(second["contacts"], json!([]));
}

#[tokio::test]
async fn test_archive_and_restore_profile() {
    require_emulator!();
    let (app, state) = emulator_app().await;

    let user = test_user(&unique_external_id("archive"), Role::Player);
    state.db.create_user(&user).await.unwrap();
    let token = common::create_session_token(&user.external_id);

    let response = send(
        &app,
        "PUT",
        "/api/profile/player",
        &token,
        Some(json!({"position": "winger"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "POST", "/api/profile/archive", &token, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["archived"], true);
    assert!(body["archived_at"].is_string());

    let profile = state
        .db
        .get_player_profile(&user.id)
        .await
        .unwrap()
        .unwrap();
    assert!(profile.is_archived());
    assert_eq!(profile.position.as_deref(), Some("winger"));

    let response = send(&app, "POST", "/api/profile/restore", &token, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["archived"], false);

    let profile = state
        .db
        .get_player_profile(&user.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!profile.is_archived());
}

#[tokio::test]
async fn test_archive_without_profile_is_not_found() {
    require_emulator!();
    let (app, state) = emulator_app().await;

    let user = test_user(&unique_external_id("archive404"), Role::Player);
    state.db.create_user(&user).await.unwrap();
    let token = common::create_session_token(&user.external_id);

    let response = send(&app, "POST", "/api/profile/archive", &token, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_prospect_creation_returns_201() {
    require_emulator!();
    let (app, state) = emulator_app().await;

    let coach = test_user(&unique_external_id("prospect"), Role::Coach);
    state.db.create_user(&coach).await.unwrap();
    let token = common::create_session_token(&coach.external_id);

    let response = send(
        &app,
        "POST",
        "/api/prospects",
        &token,
        Some(json!({
            "first_name": "Riley",
            "last_name": "Soto",
            "graduation_year": 2028
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["coach_user_id"], coach.id.as_str());
    assert!(uuid::Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());

    let stored = state.db.prospects_for_coach(&coach.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].first_name, "Riley");
}

#[tokio::test]
async fn test_prospect_weak_link_must_exist() {
    require_emulator!();
    let (app, state) = emulator_app().await;

    let coach = test_user(&unique_external_id("prospect404"), Role::Coach);
    state.db.create_user(&coach).await.unwrap();
    let token = common::create_session_token(&coach.external_id);

    let response = send(
        &app,
        "POST",
        "/api/prospects",
        &token,
        Some(json!({
            "first_name": "Riley",
            "last_name": "Soto",
            "linked_player_user_id": "no-such-player"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_account_only_calls_provider() {
    require_emulator!();
    let server = MockServer::start().await;

    let mut config = Config::test_default();
    config.identity_api_url = server.uri();
    let state = common::test_state(config, common::test_db().await);
    let app = scoutline::routes::create_router(state.clone());

    let user = test_user(&unique_external_id("selfdel"), Role::Player);
    state.db.create_user(&user).await.unwrap();
    let token = common::create_session_token(&user.external_id);

    Mock::given(method("DELETE"))
        .and(path(format!("/users/{}", user.external_id)))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let response = send(&app, "DELETE", "/api/account", &token, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);

    // Local rows wait for the provider's user.deleted webhook; nothing
    // is removed on this request.
    assert!(state
        .db
        .get_user_by_external_id(&user.external_id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_delete_account_tolerates_already_deleted() {
    require_emulator!();
    let server = MockServer::start().await;

    let mut config = Config::test_default();
    config.identity_api_url = server.uri();
    let state = common::test_state(config, common::test_db().await);
    let app = scoutline::routes::create_router(state.clone());

    let user = test_user(&unique_external_id("selfdel404"), Role::Player);
    state.db.create_user(&user).await.unwrap();
    let token = common::create_session_token(&user.external_id);

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let response = send(&app, "DELETE", "/api/account", &token, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}
