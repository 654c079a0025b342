//! Salted, adaptive password hashing (Argon2id).

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use thiserror::Error;

/// Shortest password accepted, both when hashing and when verifying.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password must be at least {MIN_PASSWORD_LEN} characters long")]
    WeakInput,

    #[error("password does not match")]
    Mismatch,

    /// The primitive failed, or a stored hash could not be parsed.
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Hashes and verifies passwords.
///
/// Hashes are PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`), so the
/// cost parameters travel with the hash and verification keeps working after
/// the defaults change. A fresh random salt is drawn for every call.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use explicit Argon2 cost parameters (tests use a cheap profile).
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        ensure_min_len(password)?;

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Check `password` against a stored PHC hash in constant time.
    pub fn verify(&self, password: &str, hash: &str) -> Result<(), PasswordError> {
        ensure_min_len(password)?;

        let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::Hash(e.to_string()))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(()),
            Err(password_hash::Error::Password) => Err(PasswordError::Mismatch),
            Err(e) => Err(PasswordError::Hash(e.to_string())),
        }
    }
}

fn ensure_min_len(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordError::WeakInput);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        // Minimum Argon2 cost keeps the suite fast.
        PasswordHasher::with_params(Params::new(8, 1, 1, None).unwrap())
    }

    #[test]
    fn hash_then_verify_succeeds() {
        let h = hasher();
        let hash = h.hash("password123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert_eq!(h.verify("password123", &hash), Ok(()));
    }

    #[test]
    fn wrong_password_is_a_mismatch() {
        let h = hasher();
        let hash = h.hash("password123").unwrap();
        assert_eq!(h.verify("password124", &hash), Err(PasswordError::Mismatch));
        assert_eq!(h.verify("PASSWORD123", &hash), Err(PasswordError::Mismatch));
    }

    #[test]
    fn hashing_is_salted() {
        let h = hasher();
        let a = h.hash("secret-pass").unwrap();
        let b = h.hash("secret-pass").unwrap();
        assert_ne!(a, b);
        assert!(h.verify("secret-pass", &a).is_ok());
        assert!(h.verify("secret-pass", &b).is_ok());
    }

    #[test]
    fn short_passwords_are_rejected_on_both_paths() {
        let h = hasher();
        assert_eq!(h.hash("12345"), Err(PasswordError::WeakInput));

        let hash = h.hash("123456").unwrap();
        assert_eq!(h.verify("12345", &hash), Err(PasswordError::WeakInput));
        assert_eq!(h.verify("123456", &hash), Ok(()));
    }

    #[test]
    fn length_is_counted_in_characters() {
        let h = hasher();
        // six characters, twelve bytes
        let hash = h.hash("ééééé1").unwrap();
        assert!(h.verify("ééééé1", &hash).is_ok());
    }

    #[test]
    fn verification_uses_parameters_embedded_in_the_hash() {
        let cheap = hasher();
        let hash = cheap.hash("password123").unwrap();

        let other = PasswordHasher::with_params(Params::new(16, 2, 1, None).unwrap());
        assert!(other.verify("password123", &hash).is_ok());
    }

    #[test]
    fn garbage_hash_is_reported_as_hash_error() {
        let h = hasher();
        assert!(matches!(
            h.verify("password123", "not-a-phc-string"),
            Err(PasswordError::Hash(_))
        ));
    }
}
