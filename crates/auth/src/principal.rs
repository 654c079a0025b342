use orgdesk_core::{OrganisationId, UserId};

use crate::TokenClaims;

/// The authenticated caller, rebuilt from a verified token.
///
/// Nothing here comes from the store: organisation names and descriptions are
/// not part of the token and must be looked up when needed. Memberships are
/// therefore carried as bare `OrganisationId`s rather than `Organisation`
/// records with empty fields. They reflect the moment of issue and are never
/// used for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub organisation_ids: Vec<OrganisationId>,
}

impl From<TokenClaims> for Principal {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            first_name: claims.first_name,
            last_name: claims.last_name,
            email: claims.email,
            phone: claims.phone,
            organisation_ids: claims.organisation_ids,
        }
    }
}
