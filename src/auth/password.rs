use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};

/// bcrypt ignores every byte past this one, so longer passwords are refused outright.
pub const MAX_PASSWORD_BYTES: usize = 72;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

/// bcrypt with a fresh random salt, so the same password never hashes the same way twice.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::BadRequest(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    hash(password, cost)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Returns `false` for a wrong password, a password bcrypt would truncate, and a
/// hash bcrypt cannot parse.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    if password.len() > MAX_PASSWORD_BYTES {
        return false;
    }
    match verify(password, hashed_password) {
        Ok(matches) => matches,
        Err(e) => {
            log::debug!("Rejecting unparseable password hash: {}", e);
            false
        }
    }
}
