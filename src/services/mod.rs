// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod deletion;
pub mod identity;
pub mod media;
pub mod session;
pub mod signature;
pub mod sync;

pub use deletion::{CascadeSummary, DeletionService};
pub use identity::IdentityClient;
pub use media::MediaClient;
pub use session::{SessionError, SessionVerifier};
pub use signature::WebhookVerifier;
pub use sync::SyncService;
