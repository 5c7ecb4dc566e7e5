// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (keyed by identity provider ID)
//! - Player/coach profiles (keyed by internal user ID)
//! - Saved-player links and coach notes (composite-keyed pairs)
//! - Prospects (manually entered, UUID-keyed)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    CoachPlayerNote, CoachProfile, InternalUser, PlayerProfile, ProspectEntry, SavedPlayerLink,
};
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their identity provider ID (the document ID).
    pub async fn get_user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<InternalUser>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(external_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user by their internal ID (a field, not the document ID).
    pub async fn get_user_by_id(&self, user_id: &str) -> Result<Option<InternalUser>, AppError> {
        let id = user_id.to_string();
        let matches: Vec<InternalUser> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field("id").eq(id.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(matches.into_iter().next())
    }

    /// Create a user document, failing if one already exists.
    ///
    /// The document ID is the external ID, so Firestore's create
    /// semantics arbitrate concurrent creation: exactly one writer
    /// wins and the rest get [`AppError::Conflict`] to absorb.
    pub async fn create_user(&self, user: &InternalUser) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&user.external_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| match e {
                firestore::errors::FirestoreError::DataConflictError(_) => {
                    AppError::Conflict(format!("user {} already exists", user.external_id))
                }
                other => AppError::Database(other.to_string()),
            })?;
        Ok(())
    }

    /// Overwrite an existing user document.
    pub async fn update_user(&self, user: &InternalUser) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.external_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a user document. The final step of account deletion.
    pub async fn delete_user_row(&self, external_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(external_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a player profile by the owning user's internal ID.
    pub async fn get_player_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<PlayerProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PLAYER_PROFILES)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or overwrite a player profile.
    pub async fn set_player_profile(&self, profile: &PlayerProfile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PLAYER_PROFILES)
            .document_id(&profile.user_id)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a player profile document.
    pub async fn delete_player_profile(&self, user_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::PLAYER_PROFILES)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a coach profile by the owning user's internal ID.
    pub async fn get_coach_profile(&self, user_id: &str) -> Result<Option<CoachProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::COACH_PROFILES)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or overwrite a coach profile.
    pub async fn set_coach_profile(&self, profile: &CoachProfile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::COACH_PROFILES)
            .document_id(&profile.user_id)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a coach profile document.
    pub async fn delete_coach_profile(&self, user_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::COACH_PROFILES)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Saved-Player Link Operations ────────────────────────────

    /// Get a single saved-player link.
    pub async fn get_saved_player(
        &self,
        coach_user_id: &str,
        player_user_id: &str,
    ) -> Result<Option<SavedPlayerLink>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SAVED_PLAYERS)
            .obj()
            .one(&SavedPlayerLink::doc_id(coach_user_id, player_user_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or overwrite a saved-player link (saving twice is a no-op).
    pub async fn set_saved_player(&self, link: &SavedPlayerLink) -> Result<(), AppError> {
        let doc_id = SavedPlayerLink::doc_id(&link.coach_user_id, &link.player_user_id);
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SAVED_PLAYERS)
            .document_id(&doc_id)
            .object(link)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a single saved-player link.
    pub async fn delete_saved_player(
        &self,
        coach_user_id: &str,
        player_user_id: &str,
    ) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::SAVED_PLAYERS)
            .document_id(&SavedPlayerLink::doc_id(coach_user_id, player_user_id))
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All links where the user is the coach side.
    pub async fn saved_players_for_coach(
        &self,
        coach_user_id: &str,
    ) -> Result<Vec<SavedPlayerLink>, AppError> {
        let coach = coach_user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SAVED_PLAYERS)
            .filter(move |q| q.for_all([q.field("coach_user_id").eq(coach.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All links where the user is the player side.
    pub async fn saved_players_referencing_player(
        &self,
        player_user_id: &str,
    ) -> Result<Vec<SavedPlayerLink>, AppError> {
        let player = player_user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SAVED_PLAYERS)
            .filter(move |q| q.for_all([q.field("player_user_id").eq(player.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Batch-delete saved-player links.
    pub async fn delete_saved_links(&self, links: &[SavedPlayerLink]) -> Result<(), AppError> {
        self.batch_delete(links, collections::SAVED_PLAYERS, |link| {
            SavedPlayerLink::doc_id(&link.coach_user_id, &link.player_user_id)
        })
        .await
    }

    // ─── Coach Note Operations ───────────────────────────────────

    /// Get a coach's note about a player.
    pub async fn get_note(
        &self,
        coach_user_id: &str,
        player_user_id: &str,
    ) -> Result<Option<CoachPlayerNote>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::COACH_NOTES)
            .obj()
            .one(&CoachPlayerNote::doc_id(coach_user_id, player_user_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or overwrite a note document.
    pub async fn set_note(&self, note: &CoachPlayerNote) -> Result<(), AppError> {
        let doc_id = CoachPlayerNote::doc_id(&note.coach_user_id, &note.player_user_id);
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::COACH_NOTES)
            .document_id(&doc_id)
            .object(note)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All notes authored by the user.
    pub async fn notes_by_coach(
        &self,
        coach_user_id: &str,
    ) -> Result<Vec<CoachPlayerNote>, AppError> {
        let coach = coach_user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::COACH_NOTES)
            .filter(move |q| q.for_all([q.field("coach_user_id").eq(coach.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All notes where the user is the subject.
    pub async fn notes_referencing_player(
        &self,
        player_user_id: &str,
    ) -> Result<Vec<CoachPlayerNote>, AppError> {
        let player = player_user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::COACH_NOTES)
            .filter(move |q| q.for_all([q.field("player_user_id").eq(player.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Batch-delete note documents.
    pub async fn delete_notes(&self, notes: &[CoachPlayerNote]) -> Result<(), AppError> {
        self.batch_delete(notes, collections::COACH_NOTES, |note| {
            CoachPlayerNote::doc_id(&note.coach_user_id, &note.player_user_id)
        })
        .await
    }

    // ─── Prospect Operations ─────────────────────────────────────

    /// Create a prospect document (IDs are fresh UUIDs, so a conflict
    /// here means an ID collision and is surfaced as-is).
    pub async fn create_prospect(&self, prospect: &ProspectEntry) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::PROSPECTS)
            .document_id(&prospect.id)
            .object(prospect)
            .execute()
            .await
            .map_err(|e| match e {
                firestore::errors::FirestoreError::DataConflictError(_) => {
                    AppError::Conflict(format!("prospect {} already exists", prospect.id))
                }
                other => AppError::Database(other.to_string()),
            })?;
        Ok(())
    }

    /// Overwrite a prospect document.
    pub async fn update_prospect(&self, prospect: &ProspectEntry) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PROSPECTS)
            .document_id(&prospect.id)
            .object(prospect)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All prospects owned by the coach.
    pub async fn prospects_for_coach(
        &self,
        coach_user_id: &str,
    ) -> Result<Vec<ProspectEntry>, AppError> {
        let coach = coach_user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PROSPECTS)
            .filter(move |q| q.for_all([q.field("coach_user_id").eq(coach.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Prospects (owned by anyone) weakly linked to the player.
    pub async fn prospects_linked_to_player(
        &self,
        player_user_id: &str,
    ) -> Result<Vec<ProspectEntry>, AppError> {
        let player = player_user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PROSPECTS)
            .filter(move |q| q.for_all([q.field("linked_player_user_id").eq(player.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Batch-delete prospect documents.
    pub async fn delete_prospects(&self, prospects: &[ProspectEntry]) -> Result<(), AppError> {
        self.batch_delete(prospects, collections::PROSPECTS, |prospect| {
            prospect.id.clone()
        })
        .await
    }

    /// Clear the weak player reference on the given prospects.
    ///
    /// Uses concurrent writes with a limit to avoid overloading Firestore.
    pub async fn unlink_prospects(&self, prospects: &[ProspectEntry]) -> Result<(), AppError> {
        let client = self.get_client()?;
        let now = chrono::Utc::now().to_rfc3339();

        stream::iter(prospects.to_vec())
            .map(|mut prospect| {
                let now = now.clone();
                async move {
                    prospect.linked_player_user_id = None;
                    prospect.updated_at = now;

                    let _: () = client
                        .fluent()
                        .update()
                        .in_col(collections::PROSPECTS)
                        .document_id(&prospect.id)
                        .object(&prospect)
                        .execute()
                        .await
                        .map_err(|e| AppError::Database(e.to_string()))?;

                    Ok::<_, AppError>(())
                }
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(())
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}
