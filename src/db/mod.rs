//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    /// User records (keyed by identity provider user ID)
    pub const USERS: &str = "users";
    /// Player profiles (keyed by internal user ID)
    pub const PLAYER_PROFILES: &str = "player_profiles";
    /// Coach profiles (keyed by internal user ID)
    pub const COACH_PROFILES: &str = "coach_profiles";
    /// Saved-player links (keyed by `{coach}_{player}`)
    pub const SAVED_PLAYERS: &str = "saved_players";
    /// Coach-player notes (keyed by `{coach}_{player}`)
    pub const COACH_NOTES: &str = "coach_notes";
    /// Manually entered prospects (keyed by UUID)
    pub const PROSPECTS: &str = "prospects";
}
