//! Credential hashing (Argon2id, PHC strings).

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use std::sync::OnceLock;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Hash a plaintext password into a salted Argon2id PHC string.
pub fn hash_password(plaintext: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verify a plaintext password against a stored PHC string.
///
/// Fails closed: a malformed secret yields `false`, never an equality check.
pub fn verify_password(plaintext: &str, secret: &str) -> bool {
    let parsed = match PasswordHash::new(secret) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!(error = %e, "stored password secret is not a valid PHC string");
            return false;
        }
    };
    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => true,
        Err(argon2::password_hash::Error::Password) => false,
        Err(e) => {
            tracing::debug!(error = %e, "password verification error");
            false
        }
    }
}

/// Run one full verification against a throwaway hash and discard the result.
///
/// Login calls this for unknown emails so they cost the same as a wrong password.
pub fn verify_against_dummy(plaintext: &str) {
    if let Some(hash) = dummy_hash() {
        let _ = verify_password(plaintext, hash);
    }
}

fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY.get_or_init(|| hash_password("chapel-dummy-credential").ok()).as_deref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash));
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hash = hash_password("hunter22").unwrap();
        assert!(!verify_password("hunter23", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn plaintext_secret_never_matches() {
        assert!(!verify_password("hunter22", "hunter22"));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn dummy_hash_is_a_real_argon2_hash_computed_once() {
        let first = dummy_hash().unwrap();
        assert!(first.starts_with("$argon2id$"));
        assert!(std::ptr::eq(first, dummy_hash().unwrap()));
        assert!(!verify_password("anything", first));
        verify_against_dummy("anything");
    }
}
