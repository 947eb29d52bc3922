//! Password hashing and verification using Argon2
//!
//! Uses argon2id variant with recommended parameters for password hashing.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::types::OpenAltError;

/// Minimum accepted password length on signup
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum accepted password length (bounds hashing cost)
pub const MAX_PASSWORD_LEN: usize = 256;

/// Hash a password using Argon2id
///
/// Returns the PHC-formatted hash string that includes the salt and parameters.
pub fn hash_password(password: &str) -> Result<String, OpenAltError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| OpenAltError::Auth(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, OpenAltError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| OpenAltError::Auth(format!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Reject passwords outside the accepted length range
pub fn validate_password_strength(password: &str) -> Result<(), OpenAltError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(OpenAltError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(OpenAltError::bad_request(format!(
            "Password must be at most {MAX_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("libreoffice-rocks").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("libreoffice-rocks", &hash).unwrap());
        assert!(!verify_password("ms-office-rocks", &hash).unwrap());
    }

    #[test]
    fn test_invalid_hash_format() {
        assert!(verify_password("password", "not-a-valid-hash").is_err());
    }

    #[test]
    fn test_strength() {
        assert!(validate_password_strength("short").is_err());
        assert!(validate_password_strength("long enough").is_ok());
        assert!(validate_password_strength(&"x".repeat(MAX_PASSWORD_LEN + 1)).is_err());
    }
}
