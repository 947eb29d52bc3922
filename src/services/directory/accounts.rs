//! Signup, login and the current user

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{caller_id, required_text, Directory, UserView};
use crate::auth::{
    hash_password, validate_password_strength, verify_password, Claims, PermissionLevel,
    TokenInput,
};
use crate::db::schemas::UserDoc;
use crate::types::{OpenAltError, Result};

const MAX_NAME_LEN: usize = 80;
const MAX_EMAIL_LEN: usize = 254;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    /// Unix timestamp (seconds)
    pub expires_at: u64,
    pub user: UserView,
}

/// Lowercased, trimmed email with a plausible shape
fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let valid = email.len() <= MAX_EMAIL_LEN
        && !email.contains(char::is_whitespace)
        && match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            }
            None => false,
        };

    if valid {
        Ok(email)
    } else {
        Err(OpenAltError::bad_request("A valid email address is required"))
    }
}

impl Directory {
    /// Create an account and sign it in
    pub async fn signup(&self, request: SignupRequest) -> Result<AuthResponse> {
        let email = normalize_email(&request.email)?;
        let name = required_text("Name", &request.name, MAX_NAME_LEN)?;
        validate_password_strength(&request.password)?;

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(OpenAltError::Conflict(
                "An account with this email already exists".into(),
            ));
        }

        let permission_level = if self.settings.admin_emails.contains(&email) {
            PermissionLevel::Admin
        } else {
            PermissionLevel::Authenticated
        };

        let password_hash = hash_password(&request.password)?;
        let mut user = UserDoc::new(email.clone(), name, password_hash, permission_level);
        let id = self.store.insert_user(user.clone()).await?;
        user.id = Some(id);

        info!(user = %id, %permission_level, "New account created");
        self.issue_token(&user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse> {
        let email = request.email.trim().to_lowercase();
        if email.is_empty() || request.password.is_empty() {
            return Err(OpenAltError::bad_request("Email and password are required"));
        }

        let invalid = || OpenAltError::Unauthorized("Invalid credentials".into());

        let user = match self.store.find_user_by_email(&email).await? {
            Some(user) if user.is_active => user,
            _ => {
                warn!("Login failed - unknown or inactive account");
                return Err(invalid());
            }
        };

        if !verify_password(&request.password, &user.password_hash)? {
            warn!(user = ?user.id, "Login failed - invalid password");
            return Err(invalid());
        }

        self.issue_token(&user)
    }

    /// Account behind a token
    pub async fn me(&self, claims: &Claims) -> Result<UserView> {
        let id = caller_id(claims)?;
        self.store
            .find_user(id)
            .await?
            .filter(|u| u.is_active)
            .map(|u| UserView::from(&u))
            .ok_or_else(|| OpenAltError::Unauthorized("Account no longer exists".into()))
    }

    fn issue_token(&self, user: &UserDoc) -> Result<AuthResponse> {
        let id = user
            .id
            .ok_or_else(|| OpenAltError::Internal("User has no id".into()))?;

        let (token, claims) = self.jwt.generate_token(TokenInput {
            user_id: id.to_hex(),
            email: user.email.clone(),
            name: user.name.clone(),
            permission_level: user.permission_level,
        })?;

        Ok(AuthResponse {
            token,
            expires_at: claims.exp,
            user: UserView::from(user),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" Ada@Example.ORG ").unwrap(), "ada@example.org");
        assert!(normalize_email("ada").is_err());
        assert!(normalize_email("ada@localhost").is_err());
        assert!(normalize_email("@example.org").is_err());
        assert!(normalize_email("a da@example.org").is_err());
        assert!(normalize_email("ada@@example.org").is_err());
    }
}
