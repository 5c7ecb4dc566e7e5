// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthSession;
use crate::models::{
    CoachPlayerNote, CoachProfile, ContactRecord, InternalUser, InterestLevel, PlayerProfile,
    ProspectEntry, Role, SavedPlayerLink,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// API routes (require a verified provider session).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/profile/player", put(update_player_profile))
        .route("/api/profile/coach", put(update_coach_profile))
        .route("/api/profile/archive", post(archive_profile))
        .route("/api/profile/restore", post(restore_profile))
        .route(
            "/api/saved-players/{player_id}",
            put(save_player).delete(unsave_player),
        )
        .route("/api/notes/{player_id}", put(upsert_note))
        .route("/api/prospects", post(create_prospect))
        .route("/api/account", delete(delete_account))
}

/// Resolve the caller's user row, bootstrapping from the identity
/// provider when the creation webhook has not arrived yet.
async fn current_user(state: &AppState, session: &AuthSession) -> Result<InternalUser> {
    state.sync.ensure_user(&session.external_id).await
}

/// Look up a target player by internal ID. A missing user and a user
/// without the player role both read as "not found" to the caller.
async fn lookup_player(state: &AppState, player_id: &str) -> Result<InternalUser> {
    let target = state
        .db
        .get_user_by_id(player_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Player {} not found", player_id)))?;
    if !target.has_role(Role::Player) {
        return Err(AppError::NotFound(format!(
            "Player {} not found",
            player_id
        )));
    }
    Ok(target)
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub id: String,
    pub external_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roles: Vec<String>,
    pub subscription_status: Option<String>,
    pub created_at: String,
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<UserResponse>> {
    let user = current_user(&state, &session).await?;

    Ok(Json(UserResponse {
        id: user.id,
        external_id: user.external_id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        roles: user.roles.iter().map(|r| r.as_str().to_string()).collect(),
        subscription_status: user.subscription_status,
        created_at: user.created_at,
    }))
}

// ─── Profiles ────────────────────────────────────────────────

/// Partial update for the caller's player profile. Absent fields keep
/// their stored values.
#[derive(Deserialize, Validate)]
struct PlayerProfileUpdate {
    #[validate(length(min = 1, max = 60, message = "Position must be 1-60 characters"))]
    position: Option<String>,
    #[validate(range(min = 2000, max = 2100, message = "Graduation year out of range"))]
    graduation_year: Option<u16>,
    #[validate(range(min = 100, max = 250, message = "Height out of range"))]
    height_cm: Option<u16>,
    #[validate(range(min = 30, max = 200, message = "Weight out of range"))]
    weight_kg: Option<u16>,
    #[validate(length(max = 120, message = "Club cannot exceed 120 characters"))]
    club: Option<String>,
    #[validate(length(max = 2000, message = "Bio cannot exceed 2000 characters"))]
    bio: Option<String>,
    #[validate(url(message = "Highlight video must be a valid URL"))]
    highlight_video_url: Option<String>,
    #[validate(url(message = "Profile image must be a valid URL"))]
    profile_image_url: Option<String>,
}

/// Partial update for the caller's coach profile.
#[derive(Deserialize, Validate)]
struct CoachProfileUpdate {
    #[validate(length(min = 1, max = 120, message = "Organization must be 1-120 characters"))]
    organization: Option<String>,
    #[validate(length(max = 80, message = "Title cannot exceed 80 characters"))]
    title: Option<String>,
    #[validate(length(max = 2000, message = "Bio cannot exceed 2000 characters"))]
    bio: Option<String>,
    #[validate(url(message = "Profile image must be a valid URL"))]
    profile_image_url: Option<String>,
}

/// Delete the previous image blob when an update replaces it.
/// Best-effort: a failure leaves an orphaned blob, not a broken profile.
async fn delete_replaced_image(
    state: &AppState,
    user_id: &str,
    old: &Option<String>,
    new: &Option<String>,
) {
    if let (Some(old_url), Some(new_url)) = (old, new) {
        if old_url != new_url {
            if let Err(e) = state.media.delete_by_url(old_url).await {
                tracing::warn!(
                    user_id,
                    error = %e,
                    "Failed to delete replaced profile image"
                );
            }
        }
    }
}

/// Create or update the caller's player profile.
async fn update_player_profile(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Json(update): Json<PlayerProfileUpdate>,
) -> Result<Json<PlayerProfile>> {
    update
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = current_user(&state, &session).await?;
    if !user.can_act_as_player() {
        return Err(AppError::Forbidden("Player role required".to_string()));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let mut profile = state
        .db
        .get_player_profile(&user.id)
        .await?
        .unwrap_or_else(|| PlayerProfile {
            user_id: user.id.clone(),
            position: None,
            graduation_year: None,
            height_cm: None,
            weight_kg: None,
            club: None,
            bio: None,
            highlight_video_url: None,
            profile_image_url: None,
            archived_at: None,
            created_at: now.clone(),
            updated_at: now.clone(),
        });

    delete_replaced_image(
        &state,
        &user.id,
        &profile.profile_image_url,
        &update.profile_image_url,
    )
    .await;

    if update.position.is_some() {
        profile.position = update.position;
    }
    if update.graduation_year.is_some() {
        profile.graduation_year = update.graduation_year;
    }
    if update.height_cm.is_some() {
        profile.height_cm = update.height_cm;
    }
    if update.weight_kg.is_some() {
        profile.weight_kg = update.weight_kg;
    }
    if update.club.is_some() {
        profile.club = update.club;
    }
    if update.bio.is_some() {
        profile.bio = update.bio;
    }
    if update.highlight_video_url.is_some() {
        profile.highlight_video_url = update.highlight_video_url;
    }
    if update.profile_image_url.is_some() {
        profile.profile_image_url = update.profile_image_url;
    }
    profile.updated_at = now;

    state.db.set_player_profile(&profile).await?;
    tracing::info!(user_id = %user.id, "Player profile updated");

    Ok(Json(profile))
}

/// Create or update the caller's coach profile.
async fn update_coach_profile(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Json(update): Json<CoachProfileUpdate>,
) -> Result<Json<CoachProfile>> {
    update
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = current_user(&state, &session).await?;
    if !user.can_act_as_coach() {
        return Err(AppError::Forbidden("Coach role required".to_string()));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let mut profile = state
        .db
        .get_coach_profile(&user.id)
        .await?
        .unwrap_or_else(|| CoachProfile {
            user_id: user.id.clone(),
            organization: None,
            title: None,
            bio: None,
            profile_image_url: None,
            archived_at: None,
            created_at: now.clone(),
            updated_at: now.clone(),
        });

    delete_replaced_image(
        &state,
        &user.id,
        &profile.profile_image_url,
        &update.profile_image_url,
    )
    .await;

    if update.organization.is_some() {
        profile.organization = update.organization;
    }
    if update.title.is_some() {
        profile.title = update.title;
    }
    if update.bio.is_some() {
        profile.bio = update.bio;
    }
    if update.profile_image_url.is_some() {
        profile.profile_image_url = update.profile_image_url;
    }
    profile.updated_at = now;

    state.db.set_coach_profile(&profile).await?;
    tracing::info!(user_id = %user.id, "Coach profile updated");

    Ok(Json(profile))
}

/// Archive state after an archive/restore call.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ArchiveStateResponse {
    pub archived: bool,
    pub archived_at: Option<String>,
}

/// Hide the caller's profiles from visibility without deleting data.
async fn archive_profile(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<ArchiveStateResponse>> {
    let user = current_user(&state, &session).await?;
    set_archived(&state, &user, Some(chrono::Utc::now().to_rfc3339())).await
}

/// Restore previously archived profiles.
async fn restore_profile(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<ArchiveStateResponse>> {
    let user = current_user(&state, &session).await?;
    set_archived(&state, &user, None).await
}

/// Apply an archived marker to whichever profiles the caller owns.
async fn set_archived(
    state: &AppState,
    user: &InternalUser,
    archived_at: Option<String>,
) -> Result<Json<ArchiveStateResponse>> {
    let now = chrono::Utc::now().to_rfc3339();
    let mut touched = false;

    if let Some(mut profile) = state.db.get_player_profile(&user.id).await? {
        profile.archived_at = archived_at.clone();
        profile.updated_at = now.clone();
        state.db.set_player_profile(&profile).await?;
        touched = true;
    }
    if let Some(mut profile) = state.db.get_coach_profile(&user.id).await? {
        profile.archived_at = archived_at.clone();
        profile.updated_at = now.clone();
        state.db.set_coach_profile(&profile).await?;
        touched = true;
    }

    if !touched {
        return Err(AppError::NotFound("No profile to update".to_string()));
    }

    tracing::info!(
        user_id = %user.id,
        archived = archived_at.is_some(),
        "Profile archive state changed"
    );

    Ok(Json(ArchiveStateResponse {
        archived: archived_at.is_some(),
        archived_at,
    }))
}

// ─── Saved Players ───────────────────────────────────────────

/// Saved-link response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SavedPlayerResponse {
    pub player_user_id: String,
    pub saved_at: String,
}

/// Save a player to the coach's shortlist. Saving an already saved
/// player returns the existing link unchanged.
async fn save_player(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(player_id): Path<String>,
) -> Result<Json<SavedPlayerResponse>> {
    let user = current_user(&state, &session).await?;
    if !user.can_act_as_coach() {
        return Err(AppError::Forbidden("Coach role required".to_string()));
    }
    let player = lookup_player(&state, &player_id).await?;

    if let Some(existing) = state.db.get_saved_player(&user.id, &player.id).await? {
        return Ok(Json(SavedPlayerResponse {
            player_user_id: existing.player_user_id,
            saved_at: existing.saved_at,
        }));
    }

    let link = SavedPlayerLink {
        coach_user_id: user.id.clone(),
        player_user_id: player.id.clone(),
        saved_at: chrono::Utc::now().to_rfc3339(),
    };
    state.db.set_saved_player(&link).await?;
    tracing::info!(coach_id = %user.id, player_id = %player.id, "Player saved");

    Ok(Json(SavedPlayerResponse {
        player_user_id: link.player_user_id,
        saved_at: link.saved_at,
    }))
}

/// Remove a player from the shortlist. Removing an absent link is a
/// no-op, so the delete is safe to retry.
async fn unsave_player(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(player_id): Path<String>,
) -> Result<StatusCode> {
    let user = current_user(&state, &session).await?;
    if !user.can_act_as_coach() {
        return Err(AppError::Forbidden("Coach role required".to_string()));
    }

    state.db.delete_saved_player(&user.id, &player_id).await?;
    tracing::info!(coach_id = %user.id, player_id = %player_id, "Player unsaved");

    Ok(StatusCode::NO_CONTENT)
}

// ─── Coach Notes ─────────────────────────────────────────────

/// Contact entry within a note payload.
#[derive(Deserialize, Validate)]
struct ContactInput {
    occurred_at: String,
    #[validate(length(min = 1, max = 60, message = "Method must be 1-60 characters"))]
    method: String,
    #[validate(length(max = 500, message = "Summary cannot exceed 500 characters"))]
    summary: Option<String>,
}

/// Full replacement payload for a coach's note about one player.
#[derive(Deserialize, Validate)]
struct NoteUpdate {
    #[validate(length(max = 5000, message = "Notes cannot exceed 5000 characters"))]
    notes: String,
    #[validate(nested)]
    contacts: Vec<ContactInput>,
    interest_level: InterestLevel,
}

/// Create or update the caller's note about a player. One note per
/// coach/player pair; contact order is stored as sent.
async fn upsert_note(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(player_id): Path<String>,
    Json(update): Json<NoteUpdate>,
) -> Result<Json<CoachPlayerNote>> {
    update
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    for contact in &update.contacts {
        if chrono::DateTime::parse_from_rfc3339(&contact.occurred_at).is_err() {
            return Err(AppError::BadRequest(
                "Contact 'occurred_at' must be an RFC3339 datetime".to_string(),
            ));
        }
    }

    let user = current_user(&state, &session).await?;
    if !user.can_act_as_coach() {
        return Err(AppError::Forbidden("Coach role required".to_string()));
    }
    let player = lookup_player(&state, &player_id).await?;

    let now = chrono::Utc::now().to_rfc3339();
    let created_at = state
        .db
        .get_note(&user.id, &player.id)
        .await?
        .map(|existing| existing.created_at)
        .unwrap_or_else(|| now.clone());

    let note = CoachPlayerNote {
        coach_user_id: user.id.clone(),
        player_user_id: player.id.clone(),
        notes: update.notes,
        contacts: update
            .contacts
            .into_iter()
            .map(|c| ContactRecord {
                occurred_at: c.occurred_at,
                method: c.method,
                summary: c.summary,
            })
            .collect(),
        interest_level: update.interest_level,
        created_at,
        updated_at: now,
    };
    state.db.set_note(&note).await?;
    tracing::info!(coach_id = %user.id, player_id = %player.id, "Coach note upserted");

    Ok(Json(note))
}

// ─── Prospects ───────────────────────────────────────────────

/// Payload for a manually entered prospect.
#[derive(Deserialize, Validate)]
struct ProspectCreate {
    #[validate(length(min = 1, max = 80, message = "First name must be 1-80 characters"))]
    first_name: String,
    #[validate(length(min = 1, max = 80, message = "Last name must be 1-80 characters"))]
    last_name: String,
    #[validate(length(max = 60, message = "Position cannot exceed 60 characters"))]
    position: Option<String>,
    #[validate(range(min = 2000, max = 2100, message = "Graduation year out of range"))]
    graduation_year: Option<u16>,
    #[validate(length(max = 120, message = "Club cannot exceed 120 characters"))]
    club: Option<String>,
    #[validate(length(max = 5000, message = "Notes cannot exceed 5000 characters"))]
    notes: Option<String>,
    /// Optional weak link to a signed-up player
    linked_player_user_id: Option<String>,
}

/// Create a prospect the coach tracks by hand.
async fn create_prospect(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Json(payload): Json<ProspectCreate>,
) -> Result<(StatusCode, Json<ProspectEntry>)> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = current_user(&state, &session).await?;
    if !user.can_act_as_coach() {
        return Err(AppError::Forbidden("Coach role required".to_string()));
    }

    // A weak link must point at a real player at creation time.
    let linked_player_user_id = match payload.linked_player_user_id {
        Some(id) => Some(lookup_player(&state, &id).await?.id),
        None => None,
    };

    let now = chrono::Utc::now().to_rfc3339();
    let prospect = ProspectEntry {
        id: uuid::Uuid::new_v4().to_string(),
        coach_user_id: user.id.clone(),
        first_name: payload.first_name,
        last_name: payload.last_name,
        position: payload.position,
        graduation_year: payload.graduation_year,
        club: payload.club,
        notes: payload.notes,
        linked_player_user_id,
        created_at: now.clone(),
        updated_at: now,
    };
    state.db.create_prospect(&prospect).await?;
    tracing::info!(coach_id = %user.id, prospect_id = %prospect.id, "Prospect created");

    Ok((StatusCode::CREATED, Json(prospect)))
}

// ─── Account Deletion ────────────────────────────────────────

/// Response for account deletion.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteAccountResponse {
    pub success: bool,
    pub message: String,
}

/// Delete the caller's account at the identity provider.
///
/// Local data is not touched here: the provider's user.deleted webhook
/// drives the cascade, so user-initiated and provider-initiated
/// deletions share a single cleanup path.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<DeleteAccountResponse>> {
    let user = current_user(&state, &session).await?;
    tracing::info!(
        external_id = %user.external_id,
        "User-initiated account deletion"
    );

    state.identity.delete_user(&user.external_id).await?;

    Ok(Json(DeleteAccountResponse {
        success: true,
        message: "Account deletion initiated. All data will be removed.".to_string(),
    }))
}
