//! Secure password hashing and verification using Argon2id.

use std::fmt;
use std::sync::{Arc, OnceLock};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier};
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::utility::tracing_targets::TRACING_TARGET_PASSWORD_HASHER as TRACING_TARGET;
use crate::{Error, Result};

/// Secure password hashing and verification service using Argon2id.
///
/// Uses the library defaults (Argon2id v19, 19 MiB memory, 2 iterations,
/// 1 lane), which match the OWASP recommendation. Digest comparison is
/// performed in constant time by the `argon2` crate.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    dummy_hash: Arc<OnceLock<Option<String>>>,
}

impl PasswordHasher {
    /// Creates a new instance of the [`PasswordHasher`] service.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Hashes a password with a fresh random salt.
    ///
    /// Returns a PHC string that embeds the algorithm, parameters and salt,
    /// suitable for long-term storage.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::Auth`] error if the hashing operation fails.
    ///
    /// [`ErrorKind::Auth`]: crate::ErrorKind::Auth
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password hashing operation failed"
                );

                Error::auth("password hashing failed").with_source(e)
            })?;

        Ok(password_hash.to_string())
    }

    /// Verifies a password against a stored PHC hash.
    ///
    /// A malformed `stored_hash` is treated as a failed verification.
    #[must_use]
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(stored_hash) {
            Ok(parsed_hash) => parsed_hash,
            Err(e) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %e,
                    "invalid password hash format"
                );

                return false;
            }
        };

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => {
                tracing::debug!(target: TRACING_TARGET, "password verification successful");
                true
            }
            Err(ArgonError::Password) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    "password verification failed: incorrect password provided"
                );
                false
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "password verification system error"
                );
                false
            }
        }
    }

    /// Performs a verification against a throwaway hash and returns `false`.
    ///
    /// Used when the account does not exist so that the response takes as
    /// long as a real verification. The throwaway hash is computed once per
    /// hasher and reused.
    pub fn verify_dummy_password(&self, password: &str) -> bool {
        let dummy_hash = self.dummy_hash.get_or_init(|| {
            let dummy_password: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(32)
                .map(char::from)
                .collect();

            self.hash_password(&dummy_password).ok()
        });

        if let Some(dummy_hash) = dummy_hash {
            let _ = self.verify_password(password, dummy_hash);
        }

        false
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("algorithm", &"argon2id")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_password() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new();
        let password = "secure_password_123";
        let hash = hasher.hash_password(password)?;

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password(password, &hash));
        assert!(!hasher.verify_password("wrong_password", &hash));

        Ok(())
    }

    #[test]
    fn hash_produces_unique_salts() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new();
        let password = "test_password";

        let hash1 = hasher.hash_password(password)?;
        let hash2 = hasher.hash_password(password)?;

        assert_ne!(hash1, hash2);
        assert!(hasher.verify_password(password, &hash1));
        assert!(hasher.verify_password(password, &hash2));

        Ok(())
    }

    #[test]
    fn verify_password_rejects_malformed_hash() {
        let hasher = PasswordHasher::new();

        assert!(!hasher.verify_password("test_password", "invalid_hash_format"));
        assert!(!hasher.verify_password("test_password", ""));
        assert!(!hasher.verify_password("test_password", "$argon2id$v=19$broken"));
    }

    #[test]
    fn dummy_verification_always_fails() {
        let hasher = PasswordHasher::new();

        assert!(!hasher.verify_dummy_password("anything"));
        assert!(!hasher.verify_dummy_password("anything"));
        assert!(hasher.dummy_hash.get().is_some());
    }

    #[test]
    fn debug_output_hides_internals() {
        let debug = format!("{:?}", PasswordHasher::new());
        assert!(debug.contains("argon2id"));
    }
}
