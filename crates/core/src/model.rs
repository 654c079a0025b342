//! Users, organisations and their membership links.

use chrono::{DateTime, Utc};

use crate::{Entity, OrganisationId, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Organisation
// ─────────────────────────────────────────────────────────────────────────────

/// An organisation: the unit of shared visibility between users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organisation {
    pub id: OrganisationId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Organisation {
    type Id = OrganisationId;

    fn id(&self) -> OrganisationId {
        self.id
    }
}

/// Input for creating an organisation; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrganisation {
    pub name: String,
    pub description: Option<String>,
}

impl NewOrganisation {
    /// The organisation every self-registered user starts with.
    pub fn default_for(first_name: &str, last_name: &str) -> Self {
        Self {
            name: format!("{first_name}'s Organisation"),
            description: Some(format!(
                "Default organization for {first_name} {last_name}"
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// A registered user together with the organisations they belong to.
///
/// # Invariants
/// - `email` is unique across all users (enforced by the store).
/// - `id` never changes after creation.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub organisations: Vec<Organisation>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn organisation_ids(&self) -> Vec<OrganisationId> {
        self.organisations.iter().map(Entity::id).collect()
    }

    pub fn is_member_of(&self, org_id: OrganisationId) -> bool {
        self.organisations.iter().any(|o| o.id == org_id)
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

// The password hash stays out of logs.
impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("phone", &self.phone)
            .field("organisations", &self.organisations)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Input for creating a user; the id is assigned by the store.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
}

impl core::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewUser")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .finish_non_exhaustive()
    }
}
