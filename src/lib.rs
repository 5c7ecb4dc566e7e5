// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Scoutline: recruiting data kept in sync with the identity provider
//!
//! This crate provides the backend API that mirrors identity provider
//! accounts into Firestore and cascades account deletion across every
//! piece of recruiting data a user left behind.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{
    DeletionService, IdentityClient, MediaClient, SessionVerifier, SyncService, WebhookVerifier,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub identity: IdentityClient,
    pub media: MediaClient,
    pub verifier: WebhookVerifier,
    pub sessions: Arc<SessionVerifier>,
    pub sync: SyncService,
    pub deletion: DeletionService,
}
