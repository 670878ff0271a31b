/// Password hashing
///
/// Thin wrapper over bcrypt. Each hash call salts independently, so two
/// hashes of the same password differ. Verification against a malformed
/// digest returns false rather than an error.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, digest: &str) -> bool {
    verify(password, digest).unwrap_or(false)
}
