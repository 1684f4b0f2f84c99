//! Argon2id password hashing.

use crate::error::{Error, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
        rand_core::OsRng,
    },
};

/// Hashes and verifies passwords in PHC string format.
///
/// Verification reads the parameters back out of the stored hash, so
/// changing the cost of a [`PasswordHasher`] never invalidates existing
/// hashes.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Argon2id with explicit cost parameters.
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hashes `password` with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if hashing fails.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
    }

    /// Checks `password` against a stored PHC hash.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the stored hash cannot be parsed or
    /// verification fails for any reason other than a mismatch.
    pub fn verify(&self, password: &str, stored: &str) -> Result<bool> {
        let parsed = PasswordHash::new(stored)
            .map_err(|err| Error::internal(format!("stored password hash is malformed: {err}")))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(Error::internal(format!(
                "password verification failed: {err}"
            ))),
        }
    }
}

impl core::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

#[cfg(test)]
pub(crate) fn cheap_hasher() -> PasswordHasher {
    // Minimum memory cost keeps debug-mode tests fast.
    PasswordHasher::with_params(Params::new(Params::MIN_M_COST, 1, 1, None).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn hash_then_verify() {
        let hasher = cheap_hasher();
        let hash = hasher.hash("pass1234").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("pass1234", &hash).unwrap());
        assert!(!hasher.verify("wrong", &hash).unwrap());
    }

    #[test]
    fn salts_differ() {
        let hasher = cheap_hasher();
        assert_ne!(hasher.hash("pass1234").unwrap(), hasher.hash("pass1234").unwrap());
    }

    #[test]
    fn malformed_hash_is_internal() {
        let err = cheap_hasher().verify("pass1234", "not-a-phc-string").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
