// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod event;
pub mod note;
pub mod profile;
pub mod prospect;
pub mod saved;
pub mod user;

pub use event::{IdentityEvent, UserDeletedPayload, UserPayload};
pub use note::{CoachPlayerNote, ContactRecord, InterestLevel};
pub use profile::{CoachProfile, PlayerProfile};
pub use prospect::ProspectEntry;
pub use saved::SavedPlayerLink;
pub use user::{InternalUser, Role};
