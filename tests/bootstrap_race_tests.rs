// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request-path bootstrap and creation-race tests.
//!
//! A user can show up with a valid session before (or without) their
//! `user.created` webhook landing. These tests require the Firestore
//! emulator; the provider REST API is a wiremock server.

use scoutline::db::FirestoreDb;
use scoutline::models::{InternalUser, Role};
use scoutline::services::sync::{NewUserAttributes, SyncService};
use scoutline::services::IdentityClient;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

/// Generate a unique external ID for test isolation.
fn unique_external_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("ext_boot_{}", nanos)
}

fn sync_service(db: &FirestoreDb, server: &MockServer) -> SyncService {
    let identity = IdentityClient::new(server.uri(), "sk_test_secret".to_string());
    SyncService::new(db.clone(), identity)
}

/// What the provider REST API returns for GET /users/{id}.
fn provider_user(id: &str, email: &str) -> serde_json::Value {
    json!({
        "id": id,
        "email_addresses": [{"email_address": email}],
        "first_name": "Boot",
        "last_name": "Strapped",
        "unsafe_metadata": {"userType": "player"}
    })
}

async fn allow_metadata_patches(server: &MockServer) {
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_ensure_user_bootstraps_from_provider() {
    require_emulator!();
    let db = common::test_db().await;
    let server = MockServer::start().await;
    let id = unique_external_id();

    Mock::given(method("GET"))
        .and(path(format!("/users/{}", id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(provider_user(&id, "boot@example.com")),
        )
        .expect(1)
        .mount(&server)
        .await;
    allow_metadata_patches(&server).await;

    let sync = sync_service(&db, &server);
    let user = sync.ensure_user(&id).await.unwrap();

    assert_eq!(user.external_id, id);
    assert_eq!(user.email, "boot@example.com");
    assert_eq!(user.roles, vec![Role::Player]);
    assert!(db.get_user_by_external_id(&id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_ensure_user_skips_provider_when_row_exists() {
    require_emulator!();
    let db = common::test_db().await;
    let server = MockServer::start().await;
    let id = unique_external_id();

    // Any provider call here is a bug: the fast path is one read.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let now = chrono::Utc::now().to_rfc3339();
    let seeded = InternalUser {
        id: uuid::Uuid::new_v4().to_string(),
        external_id: id.clone(),
        email: "seeded@example.com".to_string(),
        first_name: None,
        last_name: None,
        roles: vec![Role::Coach],
        password: "placeholder".to_string(),
        stripe_customer_id: None,
        subscription_status: None,
        created_at: now.clone(),
        updated_at: now,
    };
    db.create_user(&seeded).await.unwrap();

    let sync = sync_service(&db, &server);
    let user = sync.ensure_user(&id).await.unwrap();

    assert_eq!(user.id, seeded.id);
    assert_eq!(user.email, "seeded@example.com");
    assert_eq!(user.roles, vec![Role::Coach]);
}

#[tokio::test]
async fn test_concurrent_bootstrap_creates_single_row() {
    require_emulator!();
    let db = common::test_db().await;
    let server = MockServer::start().await;
    let id = unique_external_id();

    // Both callers may miss the read and hit the provider; the document
    // create then arbitrates and the loser re-reads the winner's row.
    Mock::given(method("GET"))
        .and(path(format!("/users/{}", id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(provider_user(&id, "race@example.com")),
        )
        .expect(1..=2)
        .mount(&server)
        .await;
    allow_metadata_patches(&server).await;

    let sync = sync_service(&db, &server);
    let (a, b) = tokio::join!(sync.ensure_user(&id), sync.ensure_user(&id));
    let a = a.unwrap();
    let b = b.unwrap();

    assert_eq!(a.id, b.id);
    assert_eq!(a.created_at, b.created_at);

    let stored = db.get_user_by_external_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.id, a.id);
}

#[tokio::test]
async fn test_webhook_and_bootstrap_race_converge() {
    require_emulator!();
    let db = common::test_db().await;
    let server = MockServer::start().await;
    let id = unique_external_id();

    Mock::given(method("GET"))
        .and(path(format!("/users/{}", id)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(provider_user(&id, "race@example.com")),
        )
        .expect(0..=1)
        .mount(&server)
        .await;
    allow_metadata_patches(&server).await;

    // The webhook-shaped upsert and a bootstrapping request land at
    // the same time.
    let webhook_attrs = NewUserAttributes {
        external_id: id.clone(),
        email: Some("race@example.com".to_string()),
        first_name: Some("Boot".to_string()),
        last_name: Some("Strapped".to_string()),
        metadata_role: None,
        signup_user_type: Some("player".to_string()),
    };

    let sync = sync_service(&db, &server);
    let (from_webhook, from_request) =
        tokio::join!(sync.upsert_user(webhook_attrs), sync.ensure_user(&id));
    let from_webhook = from_webhook.unwrap();
    let from_request = from_request.unwrap();

    assert_eq!(from_webhook.id, from_request.id);
    assert_eq!(from_webhook.email, "race@example.com");
}
