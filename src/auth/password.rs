//! Password hashing and verification using Argon2id

use crate::config::HashingConfig;
use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("Invalid Argon2 parameters: {0}")]
    Params(String),

    #[error("Failed to hash password: {0}")]
    Failed(String),
}

/// Argon2id hasher with a configurable work factor.
///
/// Holds a placeholder hash computed with the same parameters so that
/// verification against a missing or unparsable hash costs the same as a
/// real one.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    params: Params,
    placeholder: String,
}

impl CredentialHasher {
    /// Build a hasher. Computes one hash up front for the placeholder.
    pub fn new(config: HashingConfig) -> Result<Self, HashError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| HashError::Params(e.to_string()))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone());
        let placeholder = Self::hash_with(&argon2, "placeholder-password")?;

        Ok(Self {
            argon2,
            params,
            placeholder,
        })
    }

    /// Hash a password with a fresh random salt. The output is a PHC string
    /// that embeds the salt and cost parameters.
    pub fn hash(&self, password: &str) -> Result<String, HashError> {
        Self::hash_with(&self.argon2, password)
    }

    fn hash_with(argon2: &Argon2<'static>, password: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to hash password");
                HashError::Failed(e.to_string())
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored hash.
    ///
    /// Never fails: a malformed or foreign hash, or one whose parameters
    /// Argon2 rejects, is checked against the placeholder instead and
    /// yields `false`.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let parsed = match PasswordHash::new(stored) {
            Ok(parsed) if parsed.algorithm == Algorithm::Argon2id.ident() && parsed.hash.is_some() => {
                parsed
            }
            Ok(_) => {
                tracing::debug!("Stored password hash is not an Argon2id hash");
                return self.verify_placeholder(password);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Failed to parse stored password hash");
                return self.verify_placeholder(password);
            }
        };

        if let Err(e) = Params::try_from(&parsed) {
            tracing::debug!(error = %e, "Stored password hash has unusable parameters");
            return self.verify_placeholder(password);
        }

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => true,
            Err(password_hash::Error::Password) => false,
            Err(e) => {
                tracing::debug!(error = %e, "Stored password hash rejected by Argon2");
                self.verify_placeholder(password)
            }
        }
    }

    /// Spend the cost of one verification and return `false`.
    pub fn verify_placeholder(&self, password: &str) -> bool {
        if let Ok(parsed) = PasswordHash::new(&self.placeholder) {
            let _ = self.argon2.verify_password(password.as_bytes(), &parsed);
        }
        false
    }

    /// Whether `stored` was produced with parameters other than the current ones.
    pub fn needs_rehash(&self, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return true;
        };
        match Params::try_from(&parsed) {
            Ok(params) => {
                params.m_cost() != self.params.m_cost()
                    || params.t_cost() != self.params.t_cost()
                    || params.p_cost() != self.params.p_cost()
            }
            Err(_) => true,
        }
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .finish_non_exhaustive()
    }
}
