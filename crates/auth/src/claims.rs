use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orgdesk_core::{OrganisationId, User, UserId};

use crate::token::TokenError;

/// Session token payload.
///
/// Field names are the wire names clients already decode (`userId`,
/// `organisation_ids`, ...). Times are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "userId")]
    pub user_id: UserId,

    #[serde(rename = "firstName")]
    pub first_name: String,

    #[serde(rename = "lastName")]
    pub last_name: String,

    pub email: String,

    #[serde(default)]
    pub phone: Option<String>,

    /// Memberships at issuance time; may go stale until `exp`.
    pub organisation_ids: Vec<OrganisationId>,

    /// Issued-at.
    #[serde(default)]
    pub iat: i64,

    /// Expiry.
    pub exp: i64,
}

impl TokenClaims {
    pub fn for_user(user: &User, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            organisation_ids: user.organisation_ids(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }
}

/// Validate decoded claims against the clock.
///
/// Signature checks happen before this, in `TokenService`.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.user_id.is_nil() || claims.email.trim().is_empty() {
        return Err(TokenError::MalformedClaims("missing subject".to_string()));
    }
    if now.timestamp() > claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(())
}
