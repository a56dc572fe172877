use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;

const MIN_PASSWORD_LEN: usize = 8;

fn validate_email(email: &str) -> Result<(), AppError> {
    if email.trim().is_empty() {
        return Err(AppError::Validation("email is required".to_string()));
    }
    if !email.contains('@') {
        return Err(AppError::Validation(format!(
            "not a valid email address: {email}"
        )));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Login form body for `POST /auth/login/`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    /// Checked before submission; failures never reach the network.
    pub fn validate(&self) -> Result<(), AppError> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(AppError::Validation("password is required".to_string()));
        }
        Ok(())
    }
}

/// Access/refresh token pair as issued by the login endpoint. The access
/// token is short-lived; expiry is only ever discovered through a 401.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{\"access\":\"[REDACTED]\",\"refresh\":\"[REDACTED]\"}}")
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenPair {{ access: [REDACTED], refresh: [REDACTED] }}")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Response of `POST /auth/token/refresh/`. Backends that rotate refresh
/// tokens return the replacement alongside the new access token.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Registration body for `POST /auth/register/client/`.
#[derive(Debug, Clone, Serialize)]
pub struct ClientRegistration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

impl ClientRegistration {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(AppError::Validation("name is required".to_string()));
        }
        Ok(())
    }
}

/// Registration body for `POST /auth/register/barber/`.
#[derive(Debug, Clone, Serialize)]
pub struct BarberRegistration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub years_of_experience: u32,
}

impl BarberRegistration {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(AppError::Validation("name is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordResetConfirm {
    pub token: String,
    pub new_password: String,
}

impl PasswordResetConfirm {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.token.trim().is_empty() {
            return Err(AppError::Validation("reset token is required".to_string()));
        }
        validate_password(&self.new_password)
    }
}

/// Backend acknowledgement body, `{"detail": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Detail {
    pub detail: String,
}


#[cfg(test)]
mod tests_display {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_token_pair_is_redacted() {
        let pair = TokenPair {
            access: "a1".to_string(),
            refresh: "r1".to_string(),
        };
        assert_eq!(
            pair.to_string(),
            "{\"access\":\"[REDACTED]\",\"refresh\":\"[REDACTED]\"}"
        );
        assert!(!format!("{pair:?}").contains("a1"));
    }
}
