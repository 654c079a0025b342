//! Session token issuance and verification (HMAC-signed JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
    errors::ErrorKind,
};
use thiserror::Error;

use orgdesk_core::User;

use crate::{Principal, TokenClaims, validate_claims};

/// Lifetime of a freshly issued token, in seconds.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Scheme expected in the `Authorization` header.
const BEARER: &str = "Bearer";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("user id and email are required to issue a token")]
    InvalidSubject,

    #[error("authorization header must be of the form 'Bearer <token>'")]
    MalformedHeader,

    #[error("token signature or algorithm rejected")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token claims are malformed: {0}")]
    MalformedClaims(String),

    #[error("token expiry is out of range")]
    ExpiryOutOfRange,

    #[error("token encoding failed: {0}")]
    Encode(String),
}

/// Issues and verifies stateless session tokens.
///
/// The signing secret is handed in at construction; nothing is stored
/// server-side, so a token stays valid (with the memberships it was issued
/// with) until it expires.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<String, TokenError> {
        if user.id.is_nil() || user.email.trim().is_empty() {
            return Err(TokenError::InvalidSubject);
        }

        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or(TokenError::ExpiryOutOfRange)?;
        let claims = TokenClaims::for_user(user, now, expires_at);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verify a raw `Authorization` header value.
    pub fn verify(&self, header_value: &str) -> Result<Principal, TokenError> {
        self.verify_at(header_value, Utc::now())
    }

    pub fn verify_at(&self, header_value: &str, now: DateTime<Utc>) -> Result<Principal, TokenError> {
        let token = bearer_token(header_value)?;
        let claims = self.decode(token)?;
        validate_claims(&claims, now)?;
        Ok(claims.into())
    }

    fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        // A header that does not parse is a broken token, not bad claims.
        decode_header(token).map_err(|_| TokenError::BadSignature)?;

        let mut validation = Validation::new(Algorithm::HS256);
        // Any HMAC variant is accepted; everything else is rejected before
        // the signature is checked.
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // Expiry is checked against the caller's clock in `validate_claims`.
        validation.validate_exp = false;
        validation.leeway = 0;

        decode::<TokenClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::Json(err) => TokenError::MalformedClaims(err.to_string()),
                ErrorKind::MissingRequiredClaim(claim) => {
                    TokenError::MalformedClaims(format!("missing claim '{claim}'"))
                }
                _ => TokenError::BadSignature,
            })
    }
}

/// Split `"Bearer <token>"` into its token part.
fn bearer_token(header_value: &str) -> Result<&str, TokenError> {
    let mut parts = header_value.split(' ');
    let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(TokenError::MalformedHeader);
    };

    if scheme != BEARER || token.is_empty() {
        return Err(TokenError::MalformedHeader);
    }

    Ok(token)
}
