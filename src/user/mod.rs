mod password;
mod record;
pub mod validation;

pub use password::{hash_password, verify_password, HashingError, PasswordHasher};
pub use record::{UserError, UserRecord, MAX_PASSWORD_LEN, MIN_PASSWORD_LEN};
pub use validation::{ValidationError, ValidationErrors, ValidationReason};
