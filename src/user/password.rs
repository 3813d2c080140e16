use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::HashingConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashingError {
    #[error("invalid argon2 parameters: {0}")]
    InvalidParams(String),

    #[error("failed to hash password: {0}")]
    Hash(String),
}

/// Argon2id hasher with a fixed work factor.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    pub fn new(config: &HashingConfig) -> Result<Self, HashingError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| {
            error!(error = %e, ?config, "argon2 params rejected");
            HashingError::InvalidParams(e.to_string())
        })?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Hashes `plain` into a PHC string with a fresh random salt.
    pub fn hash(&self, plain: &str) -> Result<String, HashingError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let hash = argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                HashingError::Hash(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

pub fn hash_password(plain: &str) -> Result<String, HashingError> {
    PasswordHasher::default().hash(plain)
}

/// Checks `plain` against a stored PHC string. Parameters and salt come from
/// the stored hash; a malformed hash is a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            debug!(error = %e, "stored hash could not be parsed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(&HashingConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("cheap params are valid")
}
