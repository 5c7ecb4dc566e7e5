// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Coach-to-player recruiting notes.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// How interested a coach is in a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum InterestLevel {
    Low,
    Medium,
    High,
}

/// One contact event (call, visit, email) in a note's history.
/// Order within the vector is the display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ContactRecord {
    /// When the contact happened (RFC 3339)
    pub occurred_at: String,
    /// Contact channel (e.g., "call", "campus visit")
    pub method: String,
    pub summary: Option<String>,
}

/// A coach's private notes about a player. Keyed like saved-player
/// links: document ID is `{coach_user_id}_{player_user_id}`, so each
/// coach holds at most one note document per player.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CoachPlayerNote {
    pub coach_user_id: String,
    pub player_user_id: String,
    /// Free-text evaluation
    pub notes: String,
    /// Contact history, oldest first
    pub contacts: Vec<ContactRecord>,
    pub interest_level: InterestLevel,
    pub created_at: String,
    pub updated_at: String,
}

impl CoachPlayerNote {
    /// Composite document ID for this pair.
    pub fn doc_id(coach_user_id: &str, player_user_id: &str) -> String {
        format!("{}_{}", coach_user_id, player_user_id)
    }
}
