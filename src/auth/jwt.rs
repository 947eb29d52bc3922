//! JWT token handling for user sessions
//!
//! Tokens are signed with HS256 and carry the user id, email, display name
//! and permission level so handlers never need a user lookup to authorize.

use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::auth::PermissionLevel;
use crate::types::OpenAltError;

/// Payload stored in JWT token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User document id (hex ObjectId)
    pub user_id: String,
    pub email: String,
    /// Display name shown on discussions
    pub name: String,
    pub permission_level: PermissionLevel,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.permission_level.allows(PermissionLevel::Admin)
    }
}

/// Input for creating a new token
#[derive(Debug, Clone)]
pub struct TokenInput {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub permission_level: PermissionLevel,
}

/// JWT validator and generator
#[derive(Clone)]
pub struct JwtValidator {
    secret: String,
    expiry_seconds: u64,
}

impl JwtValidator {
    /// Create a new JWT validator
    ///
    /// Returns an error if the secret is empty
    pub fn new(secret: String, expiry_seconds: u64) -> Result<Self, OpenAltError> {
        if secret.is_empty() {
            return Err(OpenAltError::Config("JWT secret must not be empty".into()));
        }

        Ok(Self {
            secret,
            expiry_seconds,
        })
    }

    /// Create a validator for dev mode and tests
    pub fn new_dev() -> Self {
        Self {
            secret: "dev-mode-secret-not-for-production-use-123456".into(),
            expiry_seconds: 3600,
        }
    }

    pub fn expiry_seconds(&self) -> u64 {
        self.expiry_seconds
    }

    /// Generate a JWT token for an authenticated user
    pub fn generate_token(&self, input: TokenInput) -> Result<(String, Claims), OpenAltError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| OpenAltError::Auth(format!("System time error: {}", e)))?
            .as_secs();

        let claims = Claims {
            user_id: input.user_id,
            email: input.email,
            name: input.name,
            permission_level: input.permission_level,
            iat: now,
            exp: now + self.expiry_seconds,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| OpenAltError::Auth(format!("Failed to generate token: {}", e)))?;

        Ok((token, claims))
    }

    /// Verify and decode a JWT token
    pub fn verify_token(&self, token: &str) -> Result<Claims, OpenAltError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|err| {
            let message = match err.kind() {
                ErrorKind::ExpiredSignature => "Token expired",
                ErrorKind::InvalidToken => "Invalid token",
                ErrorKind::InvalidSignature => "Invalid signature",
                _ => "Token validation failed",
            };
            OpenAltError::Unauthorized(message.into())
        })
    }
}

/// Extract token from Authorization header.
/// Supports "Bearer <token>" format and raw tokens.
pub fn extract_token_from_header(auth_header: Option<&str>) -> Option<&str> {
    let header = auth_header?;

    if let Some(token) = header.strip_prefix("Bearer ") {
        let token = token.trim();
        return (!token.is_empty()).then_some(token);
    }

    let token = header.trim();
    if token.is_empty() || token.contains(' ') {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> TokenInput {
        TokenInput {
            user_id: "65f0c0ffee0000000000beef".into(),
            email: "ada@example.org".into(),
            name: "Ada".into(),
            permission_level: PermissionLevel::Authenticated,
        }
    }

    #[test]
    fn test_generate_and_verify() {
        let jwt = JwtValidator::new_dev();
        let (token, issued) = jwt.generate_token(input()).unwrap();
        let claims = jwt.verify_token(&token).unwrap();
        assert_eq!(claims, issued);
        assert_eq!(claims.email, "ada@example.org");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.is_admin());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let (token, _) = JwtValidator::new_dev().generate_token(input()).unwrap();
        let other = JwtValidator::new("another-secret-another-secret-xx".into(), 60).unwrap();
        assert!(matches!(
            other.verify_token(&token),
            Err(OpenAltError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(JwtValidator::new(String::new(), 60).is_err());
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token_from_header(Some("Bearer abc")), Some("abc"));
        assert_eq!(extract_token_from_header(Some("abc")), Some("abc"));
        assert_eq!(extract_token_from_header(Some("Bearer ")), None);
        assert_eq!(extract_token_from_header(Some("Basic a b")), None);
        assert_eq!(extract_token_from_header(None), None);
    }
}
