use std::fmt;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    #[error("password must be between 8 and 128 characters")]
    Length,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("stored password hash is unreadable: {0}")]
    InvalidHash(String),
}

/// Argon2 PHC string. Never rendered in logs or responses.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// Length policy, checked on its own so callers can validate before authorizing.
    pub fn check_policy(plain: &str) -> Result<(), PasswordError> {
        let length = plain.chars().count();
        if (MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&length) {
            Ok(())
        } else {
            Err(PasswordError::Length)
        }
    }

    pub fn from_plain(plain: &str) -> Result<Self, PasswordError> {
        Self::check_policy(plain)?;

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|err| PasswordError::Hashing(err.to_string()))?
            .to_string();
        Ok(Self(hash))
    }

    pub fn from_hash(hash: String) -> Self {
        Self(hash)
    }

    pub fn verify(&self, plain: &str) -> Result<bool, PasswordError> {
        let parsed =
            PasswordHash::new(&self.0).map_err(|err| PasswordError::InvalidHash(err.to_string()))?;
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_matching_password_only() {
        let hashed = HashedPassword::from_plain("corniche-view-42").expect("hashes");
        assert!(hashed.verify("corniche-view-42").expect("verifies"));
        assert!(!hashed.verify("corniche-view-43").expect("verifies"));
    }

    #[test]
    fn each_hash_gets_a_fresh_salt() {
        let first = HashedPassword::from_plain("corniche-view-42").expect("hashes");
        let second = HashedPassword::from_plain("corniche-view-42").expect("hashes");
        assert_ne!(first.as_str(), second.as_str());
        assert!(second.verify("corniche-view-42").expect("verifies"));
    }

    #[test]
    fn rejects_short_passwords() {
        assert_eq!(HashedPassword::from_plain("short"), Err(PasswordError::Length));
    }

    #[test]
    fn debug_output_is_redacted() {
        let hashed = HashedPassword::from_hash("$argon2id$v=19$secret".to_string());
        assert!(!format!("{hashed:?}").contains("secret"));
    }

    #[test]
    fn unreadable_hash_is_reported() {
        let hashed = HashedPassword::from_hash("not-a-phc-string".to_string());
        assert!(matches!(
            hashed.verify("whatever"),
            Err(PasswordError::InvalidHash(_))
        ));
    }
}
