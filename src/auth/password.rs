//! Password hashing using Argon2id (OWASP-recommended)

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash as Argon2Hash, PasswordHasher as Argon2Hasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use tracing::error;

use crate::error::CmsError;

/// Argon2id password hashing with parameters fixed at construction.
///
/// Hashing and verification run on the blocking thread pool so concurrent
/// logins cannot starve the tokio runtime.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// OWASP minimum recommended memory cost: 19 MiB (19,456 KiB)
    const MEMORY_COST: u32 = 19_456;
    /// OWASP recommended iterations (time cost)
    const TIME_COST: u32 = 2;
    /// OWASP recommended parallelism
    const PARALLELISM: u32 = 1;
    /// Output hash length in bytes
    const OUTPUT_LEN: usize = 32;

    pub fn new() -> Self {
        let params = Params::new(
            Self::MEMORY_COST,
            Self::TIME_COST,
            Self::PARALLELISM,
            Some(Self::OUTPUT_LEN),
        )
        .expect("invalid Argon2 parameters");

        Self { params }
    }

    /// Hash a password, producing a PHC-format string.
    pub async fn hash(&self, password: String) -> Result<String, CmsError> {
        let params = self.params.clone();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|h| h.to_string())
        })
        .await
        .map_err(|e| {
            error!("password hash task panicked: {e}");
            CmsError::PasswordHash
        })?
        .map_err(|e| {
            error!("failed to hash password: {e}");
            CmsError::PasswordHash
        })
    }

    /// Verify a password against a stored PHC-format hash.
    pub async fn verify(&self, password: String, hash: String) -> Result<bool, CmsError> {
        tokio::task::spawn_blocking(move || {
            let parsed_hash = Argon2Hash::new(&hash).map_err(|e| {
                error!("failed to parse stored password hash: {e}");
                CmsError::PasswordHash
            })?;

            // Parameters are carried inside the PHC string.
            let argon2 = Argon2::default();
            Ok(argon2
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok())
        })
        .await
        .map_err(|e| {
            error!("password verify task panicked: {e}");
            CmsError::PasswordHash
        })?
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashing_and_verification_roundtrip() {
        let hasher = PasswordHasher::new();
        let password = "test_password_123";

        let hash = hasher.hash(password.to_string()).await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(
            hasher
                .verify(password.to_string(), hash.clone())
                .await
                .unwrap()
        );
        assert!(
            !hasher
                .verify("wrong_password".to_string(), hash)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn same_password_hashes_differently() {
        let hasher = PasswordHasher::new();
        let password = "same_password";

        let hash1 = hasher.hash(password.to_string()).await.unwrap();
        let hash2 = hasher.hash(password.to_string()).await.unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify(password.to_string(), hash1).await.unwrap());
        assert!(hasher.verify(password.to_string(), hash2).await.unwrap());
    }
}
