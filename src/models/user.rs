//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// Application role, single-sourced from identity provider metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Player,
    Coach,
}

impl Role {
    /// Parse a metadata role string. Unknown values are rejected so a
    /// typo in provider metadata can never mint an admin.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "player" => Some(Role::Player),
            "coach" => Some(Role::Coach),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Player => "player",
            Role::Coach => "coach",
        }
    }
}

/// User record stored in Firestore.
///
/// The document ID is the identity provider's user ID (`external_id`),
/// which makes document creation the uniqueness arbiter when a webhook
/// and a request-path bootstrap race to create the same user. Dependent
/// rows reference the internal `id`, never the external one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalUser {
    /// Internal UUID, referenced by profiles, links and notes
    pub id: String,
    /// Identity provider user ID (also used as document ID)
    pub external_id: String,
    /// Primary email address
    pub email: String,
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// Roles held by this user
    pub roles: Vec<Role>,
    /// Randomly generated placeholder; sessions come from the identity
    /// provider so this is never used to authenticate
    pub password: String,
    /// Billing customer reference, written by the billing flow only
    pub stripe_customer_id: Option<String>,
    /// Billing subscription status, written by the billing flow only
    pub subscription_status: Option<String>,
    /// When the user was first created (RFC 3339)
    pub created_at: String,
    /// Last sync or edit timestamp (RFC 3339)
    pub updated_at: String,
}

impl InternalUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Coaches and admins may use the coach-side endpoints.
    pub fn can_act_as_coach(&self) -> bool {
        self.has_role(Role::Coach) || self.has_role(Role::Admin)
    }

    pub fn can_act_as_player(&self) -> bool {
        self.has_role(Role::Player) || self.has_role(Role::Admin)
    }
}
