//! Password hashing.
//!
//! New hashes are Argon2id PHC strings. Accounts created before the upgrade
//! carry a 64-hex-digit SHA-256 of `"{salt}:{password}"`; those still verify
//! and report [`PasswordHasher::needs_rehash`] so login can upgrade them.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use sha2::{Digest, Sha256};

use super::AuthError;

#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    legacy_salt: String,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("algorithm", &"argon2id")
            .finish()
    }
}

impl PasswordHasher {
    pub fn new(legacy_salt: impl Into<String>) -> Self {
        Self {
            argon2: Argon2::default(),
            legacy_salt: legacy_salt.into(),
        }
    }

    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        use argon2::PasswordHasher as _;

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashingError(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Check a password against either hash format; malformed hashes never match
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        if Self::is_legacy(stored_hash) {
            return self.legacy_hash(password) == stored_hash.to_ascii_lowercase();
        }
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    pub fn needs_rehash(&self, stored_hash: &str) -> bool {
        Self::is_legacy(stored_hash)
    }

    /// Hash in the pre-Argon2 format
    pub fn legacy_hash(&self, password: &str) -> String {
        let digest = Sha256::digest(format!("{}:{password}", self.legacy_salt).as_bytes());
        format!("{digest:x}")
    }

    fn is_legacy(stored_hash: &str) -> bool {
        stored_hash.len() == 64 && stored_hash.chars().all(|c| c.is_ascii_hexdigit())
    }
}
