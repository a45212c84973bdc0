//! User domain models

use chrono::{DateTime, Utc};
use secrecy::Secret;
use std::fmt;

/// Normalized user identifier (trimmed, lower-cased email).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Normalize raw input. Returns `None` when nothing is left after trimming.
    pub fn normalize(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored credential record
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub identifier: Identifier,
    /// PHC-format Argon2id hash; redacted in `Debug`
    pub password_hash: Secret<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn new(identifier: Identifier, password_hash: String, created_at: DateTime<Utc>) -> Self {
        Self {
            identifier,
            password_hash: Secret::new(password_hash),
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_normalization() {
        let id = Identifier::normalize("  Alice@Example.COM ").unwrap();
        assert_eq!(id.as_str(), "alice@example.com");
        assert_eq!(id, Identifier::normalize("alice@example.com").unwrap());
    }

    #[test]
    fn test_blank_identifier_rejected() {
        assert!(Identifier::normalize("").is_none());
        assert!(Identifier::normalize("   \t").is_none());
    }

    #[test]
    fn test_record_debug_redacts_hash() {
        let record = UserRecord::new(
            Identifier::normalize("alice@example.com").unwrap(),
            "$argon2id$v=19$m=1024,t=1,p=1$c2FsdA$aGFzaA".to_string(),
            Utc::now(),
        );
        let debug = format!("{:?}", record);
        assert!(debug.contains("alice@example.com"));
        assert!(!debug.contains("argon2id"));
    }
}
