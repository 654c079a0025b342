//! `orgdesk-auth` — authentication and membership authorization.
//!
//! This crate is decoupled from HTTP and from any concrete store: the
//! authorizer talks to persistence only through `orgdesk_core::Directory`.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod principal;
pub mod token;

pub use authorize::{AuthzError, MembershipAuthorizer, shares_organisation};
pub use claims::{TokenClaims, validate_claims};
pub use password::{MIN_PASSWORD_LEN, PasswordError, PasswordHasher};
pub use principal::Principal;
pub use token::{DEFAULT_TOKEN_TTL_SECS, TokenError, TokenService};
