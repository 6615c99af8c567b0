use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::error;

use crate::config::HashingConfig;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("stored password hash is corrupt: {0}")]
    Corrupt(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Argon2 hasher built from [`HashingConfig`].
///
/// Verification takes variant and cost from the stored PHC string, so hashes
/// produced under older settings keep verifying after the config changes.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    scheme: argon2::Algorithm,
    params: Params,
}

impl CredentialHasher {
    pub fn new(cfg: &HashingConfig) -> Self {
        Self {
            scheme: cfg.scheme,
            params: cfg.params.clone(),
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(self.scheme, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, plain: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                CredentialError::Hash(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// A mismatch is `Ok(false)`; only an unreadable stored hash is an error.
    pub fn verify(&self, plain: &str, hash: &str) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            CredentialError::Corrupt(e.to_string())
        })?;
        match self.argon2().verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => {
                error!(error = %e, "argon2 verify error");
                Err(CredentialError::Corrupt(e.to_string()))
            }
        }
    }

    /// True when `hash` was not produced with the current variant and cost.
    pub fn needs_rehash(&self, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return true;
        };
        let same_scheme = argon2::Algorithm::try_from(parsed.algorithm)
            .map(|alg| alg == self.scheme)
            .unwrap_or(false);
        let same_cost = Params::try_from(&parsed)
            .map(|p| {
                p.m_cost() == self.params.m_cost()
                    && p.t_cost() == self.params.t_cost()
                    && p.p_cost() == self.params.p_cost()
            })
            .unwrap_or(false);
        !(same_scheme && same_cost)
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> CredentialHasher {
    CredentialHasher::new(&HashingConfig {
        scheme: argon2::Algorithm::Argon2id,
        params: Params::new(1024, 1, 1, None).expect("valid params"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hasher = test_hasher();
        let password = "Secur3P@ssw0rd!";
        let hash = hasher.hash(password).expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hasher = test_hasher();
        let hash = hasher.hash("correct-horse-battery-staple").unwrap();
        assert!(!hasher.verify("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let hasher = test_hasher();
        let a = hasher.hash("secret123").unwrap();
        let b = hasher.hash("secret123").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("secret123", &a).unwrap());
        assert!(hasher.verify("secret123", &b).unwrap());
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = test_hasher().verify("anything", "not-a-valid-hash").unwrap_err();
        assert!(matches!(err, CredentialError::Corrupt(_)));
    }

    #[test]
    fn hashes_from_older_settings_still_verify_but_need_rehash() {
        let old = CredentialHasher::new(&HashingConfig {
            scheme: argon2::Algorithm::Argon2i,
            params: Params::new(512, 2, 1, None).unwrap(),
        });
        let current = test_hasher();

        let legacy = old.hash("secret123").unwrap();
        assert!(current.verify("secret123", &legacy).unwrap());
        assert!(current.needs_rehash(&legacy));

        let fresh = current.hash("secret123").unwrap();
        assert!(!current.needs_rehash(&fresh));
    }
}
