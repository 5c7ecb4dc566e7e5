// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Saved-player links (a coach's shortlist).

use serde::{Deserialize, Serialize};

/// One coach saving one player. The document ID is
/// `{coach_user_id}_{player_user_id}`, so saving twice is a plain
/// overwrite and the pair is unique by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPlayerLink {
    pub coach_user_id: String,
    pub player_user_id: String,
    /// When the player was saved (RFC 3339)
    pub saved_at: String,
}

impl SavedPlayerLink {
    /// Composite document ID for this pair.
    pub fn doc_id(coach_user_id: &str, player_user_id: &str) -> String {
        format!("{}_{}", coach_user_id, player_user_id)
    }
}
