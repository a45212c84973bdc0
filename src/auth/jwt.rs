//! Session token issue and validation
//! HS256 JWT over `{sub, iat, exp}`; expiry is checked against an injected clock

use super::clock::Clock;
use crate::{config::AppConfig, error::AppError, models::auth::SessionToken};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use thiserror::Error;

/// Minimum signing secret length for HS256
pub const MIN_SECRET_LEN: usize = 32;

/// Token claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (normalized identifier)
    pub sub: String,

    /// Issued at (unix seconds)
    pub iat: i64,

    /// Expiration (unix seconds, exclusive)
    pub exp: i64,
}

/// Why a token was rejected. Never leaves the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("token signature or claims invalid")]
    Invalid,

    #[error("token is not three dot-separated parts")]
    Malformed,

    #[error("token ttl must be at least one second")]
    InvalidTtl,

    #[error("failed to encode token: {0}")]
    Encoding(String),
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(
        secret: &Secret<String>,
        default_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let secret = secret.expose_secret();

        if secret.len() < MIN_SECRET_LEN {
            return Err(AppError::Config(format!(
                "Token secret too short (min {} chars)",
                MIN_SECRET_LEN
            )));
        }
        if default_ttl.as_secs() < 1 {
            return Err(AppError::Config(
                "Token ttl must be at least one second".to_string(),
            ));
        }

        // Expiry is evaluated by `validate` against `clock`, not wall time.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            default_ttl,
            clock,
        })
    }

    pub fn from_config(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        Self::new(
            &config.security.token_secret,
            config.security.token_ttl(),
            clock,
        )
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a token valid over `[now, now + ttl)`. Sub-second parts of
    /// `ttl` are truncated.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<SessionToken, TokenError> {
        let ttl_secs = i64::try_from(ttl.as_secs()).map_err(|_| TokenError::InvalidTtl)?;
        if ttl_secs < 1 {
            return Err(TokenError::InvalidTtl);
        }

        let iat = self.clock.now().timestamp();
        let exp = iat.checked_add(ttl_secs).ok_or(TokenError::InvalidTtl)?;

        let claims = Claims {
            sub: subject.to_string(),
            iat,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(SessionToken::new(token, iat, exp))
    }

    /// Validate a token and return its subject.
    pub fn validate(&self, token: &str) -> Result<String, TokenError> {
        if token.split('.').count() != 3 || token.split('.').any(str::is_empty) {
            return Err(TokenError::Malformed);
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidToken => TokenError::Malformed,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?
            .claims;

        let now = self.clock.now().timestamp();
        if now < claims.iat {
            return Err(TokenError::Invalid);
        }
        if now >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims.sub)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;
    use chrono::{TimeZone, Utc};

    fn issuer() -> (TokenIssuer, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let issuer = TokenIssuer::new(
            &Secret::new("test_secret_key_32_characters_long!".to_string()),
            Duration::from_secs(3600),
            Arc::new(clock.clone()),
        )
        .unwrap();
        (issuer, clock)
    }

    #[test]
    fn test_issue_and_validate() {
        let (issuer, _) = issuer();
        let token = issuer.issue("alice@example.com", issuer.default_ttl()).unwrap();

        assert_eq!(token.expires_at() - token.issued_at(), 3600);
        assert_eq!(issuer.validate(token.expose()).unwrap(), "alice@example.com");
    }

    #[test]
    fn test_window_is_half_open() {
        let (issuer, clock) = issuer();
        let token = issuer.issue("alice@example.com", Duration::from_secs(10)).unwrap();

        clock.advance(chrono::Duration::seconds(9));
        assert!(issuer.validate(token.expose()).is_ok());

        clock.advance(chrono::Duration::seconds(1));
        assert_eq!(issuer.validate(token.expose()), Err(TokenError::Expired));
    }

    #[test]
    fn test_token_from_the_future_is_invalid() {
        let (issuer, clock) = issuer();
        let token = issuer.issue("alice@example.com", Duration::from_secs(10)).unwrap();

        clock.advance(chrono::Duration::seconds(-5));
        assert_eq!(issuer.validate(token.expose()), Err(TokenError::Invalid));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let (issuer, _) = issuer();
        assert_eq!(
            issuer.issue("alice@example.com", Duration::ZERO).unwrap_err(),
            TokenError::InvalidTtl
        );
        assert_eq!(
            issuer.issue("alice@example.com", Duration::from_millis(999)).unwrap_err(),
            TokenError::InvalidTtl
        );
    }

    #[test]
    fn test_malformed_tokens() {
        let (issuer, _) = issuer();
        assert_eq!(issuer.validate("invalid_token"), Err(TokenError::Malformed));
        assert_eq!(issuer.validate("a.b"), Err(TokenError::Malformed));
        assert_eq!(issuer.validate("a..c"), Err(TokenError::Malformed));
        assert_eq!(issuer.validate("a.b.c.d"), Err(TokenError::Malformed));
        assert_eq!(issuer.validate(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_garbage_parts_are_invalid() {
        let (issuer, _) = issuer();
        assert_eq!(issuer.validate("a.b.c"), Err(TokenError::Invalid));
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = TokenIssuer::new(
            &Secret::new("short".to_string()),
            Duration::from_secs(3600),
            Arc::new(crate::auth::clock::SystemClock),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
