// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Manually entered prospects.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A prospect a coach tracked by hand before (or without) the player
/// ever signing up. Owned by the coach; `linked_player_user_id` is a
/// weak reference that is cleared, not cascaded, when the player's
/// account is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProspectEntry {
    /// Generated UUID (also the document ID)
    pub id: String,
    /// Owning coach's internal user ID
    pub coach_user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub position: Option<String>,
    pub graduation_year: Option<u16>,
    pub club: Option<String>,
    pub notes: Option<String>,
    /// Set when the prospect is matched to a real player account
    pub linked_player_user_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
