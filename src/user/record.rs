use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::password::{verify_password, HashingError, PasswordHasher};
use super::validation::{email, length, required, required_if, ValidationErrors, Validator};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Hashing(#[from] HashingError),
}

/// User row as it moves between a request, the store and a response.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub email: String,
    /// Plaintext from the client; omitted from output once cleared.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    /// Argon2 PHC string, never read from or written to JSON.
    #[serde(skip)]
    password_hash: String,
}

impl UserRecord {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Rebuilds a record loaded by the store. The plaintext is always empty.
    pub fn from_storage(id: i64, email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            password: String::new(),
            password_hash: password_hash.into(),
        }
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn has_credential(&self) -> bool {
        !self.password_hash.is_empty()
    }

    pub fn normalize_email(&mut self) {
        self.email = self.email.trim().to_lowercase();
    }

    /// Checks every field and reports all failures at once.
    ///
    /// The password is only required while no hash is stored, so an update
    /// that leaves the password alone passes; any supplied password must
    /// still fit the length bounds.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .field("email", &self.email, &[&required(), &email()])
            .field(
                "password",
                &self.password,
                &[
                    &required_if(|| self.password_hash.is_empty()),
                    &length(MIN_PASSWORD_LEN, MAX_PASSWORD_LEN),
                ],
            )
            .finish()
    }

    /// Hashes a supplied plaintext into `password_hash` before insert.
    /// Without a plaintext the stored hash is kept. The plaintext itself is
    /// left in place; see [`UserRecord::sanitize`].
    #[instrument(skip_all, fields(user_id = self.id))]
    pub fn prepare_for_persistence(&mut self, hasher: &PasswordHasher) -> Result<(), HashingError> {
        if self.password.is_empty() {
            debug!("no new password supplied, keeping stored hash");
            return Ok(());
        }
        // assigned only on success; a HashingError leaves the old hash
        self.password_hash = hasher.hash(&self.password)?;
        debug!("password hashed");
        Ok(())
    }

    /// `validate` followed by `prepare_for_persistence`.
    pub fn prepare_for_create(&mut self, hasher: &PasswordHasher) -> Result<(), UserError> {
        if let Err(errs) = self.validate() {
            warn!(user_id = self.id, errors = %errs, "user rejected");
            return Err(errs.into());
        }
        self.prepare_for_persistence(hasher)?;
        Ok(())
    }

    /// Clears the plaintext. Must run before the record leaves the service.
    pub fn sanitize(&mut self) {
        self.password.clear();
    }

    pub fn verify_credential(&self, supplied: &str) -> bool {
        verify_password(supplied, &self.password_hash)
    }
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |s: &str| if s.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password", &redact(&self.password))
            .field("password_hash", &redact(&self.password_hash))
            .finish()
    }
}
