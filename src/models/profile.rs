// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Player and coach profile models.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A player's recruiting profile, stored in Firestore with the owning
/// user's internal ID as the document ID (one profile per user).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PlayerProfile {
    /// Owning user's internal ID (also the document ID)
    pub user_id: String,
    /// Field position (e.g., "goalkeeper")
    pub position: Option<String>,
    /// High-school graduation year
    pub graduation_year: Option<u16>,
    pub height_cm: Option<u16>,
    pub weight_kg: Option<u16>,
    /// Current club or school team
    pub club: Option<String>,
    pub bio: Option<String>,
    pub highlight_video_url: Option<String>,
    /// Uploaded profile image; the URL is the media store reference
    pub profile_image_url: Option<String>,
    /// Soft-delete marker; archived profiles are hidden, not removed
    pub archived_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl PlayerProfile {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

/// A coach's profile, same keying as [`PlayerProfile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CoachProfile {
    /// Owning user's internal ID (also the document ID)
    pub user_id: String,
    /// School or club the coach recruits for
    pub organization: Option<String>,
    /// Job title (e.g., "Head Coach")
    pub title: Option<String>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub archived_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl CoachProfile {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}
