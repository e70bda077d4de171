//! Password hashing and verification.
//!
//! bcrypt with a fixed work factor. Only the hash ever crosses the storage
//! boundary; plaintext passwords are never persisted or logged.

use anyhow::Context;

use crate::errors::AppError;

/// Fixed bcrypt work factor.
const BCRYPT_COST: u32 = 10;

/// One-way salted hash of `password`.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let hash = bcrypt::hash(password, BCRYPT_COST).context("bcrypt hashing failed")?;
    Ok(hash)
}

/// Checks `password` against a stored hash. Fails closed: a malformed hash
/// verifies as `false`, never as an error the caller could mishandle.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_accepts_matching_password() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash));
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(!verify_password("battery staple", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same-password", &a));
        assert!(verify_password("same-password", &b));
    }

    #[test]
    fn test_hash_uses_fixed_cost() {
        let hash = hash_password("whatever").unwrap();
        assert!(hash.contains("$10$"), "unexpected hash format: {hash}");
    }

    #[test]
    fn test_verify_fails_closed_on_malformed_hash() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
        assert!(!verify_password("anything", ""));
    }
}
