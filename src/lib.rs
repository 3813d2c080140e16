//! User record validation, Argon2 password hashing and response sanitization.

pub mod config;
pub mod telemetry;
pub mod user;

pub use config::{AppConfig, HashingConfig, LogConfig};
pub use user::{
    HashingError, PasswordHasher, UserError, UserRecord, ValidationError, ValidationErrors,
    ValidationReason,
};
