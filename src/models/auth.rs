//! Authentication-related models

use secrecy::{ExposeSecret, Secret};
use serde::Serialize;

/// Identifier/password pair for a single register or authenticate call.
/// Consumed by the call; the password is zeroized on drop.
#[derive(Debug)]
pub struct Credential {
    pub identifier: String,
    pub password: Secret<String>,
}

impl Credential {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: Secret::new(password.into()),
        }
    }
}

/// Signed session token handed back to the caller
#[derive(Debug, Clone)]
pub struct SessionToken {
    value: Secret<String>,
    issued_at: i64,
    expires_at: i64,
}

impl SessionToken {
    pub(crate) fn new(value: String, issued_at: i64, expires_at: i64) -> Self {
        Self {
            value: Secret::new(value),
            issued_at,
            expires_at,
        }
    }

    /// Raw token string, for transmission to the client only
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    /// Unix seconds
    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }

    /// Unix seconds, exclusive
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    pub fn expires_in(&self) -> u64 {
        (self.expires_at - self.issued_at).max(0) as u64
    }
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: u64,
    pub expires_at: i64,
}

impl From<SessionToken> for LoginResponse {
    fn from(token: SessionToken) -> Self {
        Self {
            token: token.expose().to_string(),
            expires_in: token.expires_in(),
            expires_at: token.expires_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_hides_password() {
        let credential = Credential::new("alice@example.com", "Secr3t!");
        assert!(!format!("{:?}", credential).contains("Secr3t!"));
    }

    #[test]
    fn test_session_token_debug_hides_value() {
        let token = SessionToken::new("header.claims.signature".to_string(), 10, 3610);
        assert!(!format!("{:?}", token).contains("signature"));
        assert_eq!(token.expires_in(), 3600);
    }
}
