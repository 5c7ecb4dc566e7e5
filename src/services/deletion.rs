// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cascading account deletion.
//!
//! When the identity provider reports a user gone, every internal row
//! referencing that user has to go too: profiles (with their uploaded
//! media), saved-player links and notes in both directions, and the
//! user's prospects. The user row itself is removed last, so a crash
//! mid-cascade leaves a root that provider redelivery will re-drive.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::InternalUser;
use crate::services::media::MediaClient;

/// What a cascade run actually removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub profiles_deleted: usize,
    pub media_deleted: usize,
    pub links_deleted: usize,
    pub notes_deleted: usize,
    pub prospects_deleted: usize,
    pub prospects_unlinked: usize,
    /// Dependent steps that failed and were skipped over
    pub dependent_failures: usize,
    /// False only for the no-op case (user was never mirrored or is
    /// already gone)
    pub user_removed: bool,
}

/// Orchestrates ordered, fault-isolated account deletion.
#[derive(Clone)]
pub struct DeletionService {
    db: FirestoreDb,
    media: MediaClient,
}

impl DeletionService {
    pub fn new(db: FirestoreDb, media: MediaClient) -> Self {
        Self { db, media }
    }

    /// Delete all data for a deleted identity.
    ///
    /// Dependent-step failures are logged and skipped so one bad row
    /// can't strand the rest; only a failure to remove the user row
    /// itself surfaces, which makes the provider redeliver and the
    /// whole (idempotent) cascade run again.
    pub async fn delete_account_data(&self, external_id: &str) -> Result<CascadeSummary, AppError> {
        let mut summary = CascadeSummary::default();

        // 1. Resolve the root. Absent means nothing to do: either the
        //    user was never mirrored or an earlier run already finished.
        let Some(user) = self.db.get_user_by_external_id(external_id).await? else {
            tracing::info!(external_id, "No internal user for deleted identity (no-op)");
            return Ok(summary);
        };

        // 2. Profiles, media first
        if let Err(e) = self.remove_player_profile(&user, &mut summary).await {
            summary.dependent_failures += 1;
            tracing::error!(
                external_id,
                error = %e,
                "Player profile cleanup failed, continuing cascade"
            );
        }
        if let Err(e) = self.remove_coach_profile(&user, &mut summary).await {
            summary.dependent_failures += 1;
            tracing::error!(
                external_id,
                error = %e,
                "Coach profile cleanup failed, continuing cascade"
            );
        }

        // 3. Saved-player links, both directions
        if let Err(e) = self.remove_saved_links(&user, &mut summary).await {
            summary.dependent_failures += 1;
            tracing::error!(
                external_id,
                error = %e,
                "Saved-link cleanup failed, continuing cascade"
            );
        }

        // 4. Notes, both directions
        if let Err(e) = self.remove_notes(&user, &mut summary).await {
            summary.dependent_failures += 1;
            tracing::error!(
                external_id,
                error = %e,
                "Note cleanup failed, continuing cascade"
            );
        }

        // 5. Prospects: delete owned rows, unlink weak references
        if let Err(e) = self.remove_prospects(&user, &mut summary).await {
            summary.dependent_failures += 1;
            tracing::error!(
                external_id,
                error = %e,
                "Prospect cleanup failed, continuing cascade"
            );
        }

        // 6. The user row, always last and never absorbed
        self.db.delete_user_row(external_id).await?;
        summary.user_removed = true;

        tracing::info!(
            external_id,
            user_id = %user.id,
            profiles = summary.profiles_deleted,
            media = summary.media_deleted,
            links = summary.links_deleted,
            notes = summary.notes_deleted,
            prospects = summary.prospects_deleted,
            unlinked = summary.prospects_unlinked,
            failures = summary.dependent_failures,
            "Account cascade complete"
        );

        Ok(summary)
    }

    async fn remove_player_profile(
        &self,
        user: &InternalUser,
        summary: &mut CascadeSummary,
    ) -> Result<(), AppError> {
        let Some(profile) = self.db.get_player_profile(&user.id).await? else {
            return Ok(());
        };

        // A failed blob delete never blocks the row delete.
        if let Some(url) = &profile.profile_image_url {
            match self.media.delete_by_url(url).await {
                Ok(()) => summary.media_deleted += 1,
                Err(e) => {
                    summary.dependent_failures += 1;
                    tracing::error!(
                        user_id = %user.id,
                        error = %e,
                        "Player image delete failed, removing profile anyway"
                    );
                }
            }
        }

        self.db.delete_player_profile(&user.id).await?;
        summary.profiles_deleted += 1;
        tracing::debug!(user_id = %user.id, "Deleted player profile");
        Ok(())
    }

    async fn remove_coach_profile(
        &self,
        user: &InternalUser,
        summary: &mut CascadeSummary,
    ) -> Result<(), AppError> {
        let Some(profile) = self.db.get_coach_profile(&user.id).await? else {
            return Ok(());
        };

        if let Some(url) = &profile.profile_image_url {
            match self.media.delete_by_url(url).await {
                Ok(()) => summary.media_deleted += 1,
                Err(e) => {
                    summary.dependent_failures += 1;
                    tracing::error!(
                        user_id = %user.id,
                        error = %e,
                        "Coach image delete failed, removing profile anyway"
                    );
                }
            }
        }

        self.db.delete_coach_profile(&user.id).await?;
        summary.profiles_deleted += 1;
        tracing::debug!(user_id = %user.id, "Deleted coach profile");
        Ok(())
    }

    async fn remove_saved_links(
        &self,
        user: &InternalUser,
        summary: &mut CascadeSummary,
    ) -> Result<(), AppError> {
        let as_coach = self.db.saved_players_for_coach(&user.id).await?;
        self.db.delete_saved_links(&as_coach).await?;
        summary.links_deleted += as_coach.len();

        let as_player = self.db.saved_players_referencing_player(&user.id).await?;
        self.db.delete_saved_links(&as_player).await?;
        summary.links_deleted += as_player.len();

        tracing::debug!(
            user_id = %user.id,
            as_coach = as_coach.len(),
            as_player = as_player.len(),
            "Deleted saved-player links"
        );
        Ok(())
    }

    async fn remove_notes(
        &self,
        user: &InternalUser,
        summary: &mut CascadeSummary,
    ) -> Result<(), AppError> {
        let authored = self.db.notes_by_coach(&user.id).await?;
        self.db.delete_notes(&authored).await?;
        summary.notes_deleted += authored.len();

        let about = self.db.notes_referencing_player(&user.id).await?;
        self.db.delete_notes(&about).await?;
        summary.notes_deleted += about.len();

        tracing::debug!(
            user_id = %user.id,
            authored = authored.len(),
            about = about.len(),
            "Deleted notes"
        );
        Ok(())
    }

    async fn remove_prospects(
        &self,
        user: &InternalUser,
        summary: &mut CascadeSummary,
    ) -> Result<(), AppError> {
        let owned = self.db.prospects_for_coach(&user.id).await?;
        self.db.delete_prospects(&owned).await?;
        summary.prospects_deleted += owned.len();

        let linked = self.db.prospects_linked_to_player(&user.id).await?;
        self.db.unlink_prospects(&linked).await?;
        summary.prospects_unlinked += linked.len();

        tracing::debug!(
            user_id = %user.id,
            owned = owned.len(),
            unlinked = linked.len(),
            "Cleaned up prospects"
        );
        Ok(())
    }
}
