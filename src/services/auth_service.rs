//! 认证服务：注册、登录、令牌校验

use crate::{
    auth::{
        clock::{Clock, SystemClock},
        jwt::{TokenError, TokenIssuer},
        password::CredentialHasher,
    },
    config::AppConfig,
    error::{AppError, AuthError},
    models::{
        auth::{Credential, SessionToken},
        user::{Identifier, UserRecord},
    },
    repository::{StoreError, UserStore},
};
use secrecy::ExposeSecret;
use std::{future::Future, sync::Arc, time::Duration};

pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: Arc<CredentialHasher>,
    issuer: Arc<TokenIssuer>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<CredentialHasher>,
        issuer: Arc<TokenIssuer>,
        clock: Arc<dyn Clock>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            hasher,
            issuer,
            clock,
            store_timeout,
        }
    }

    /// Wire the service from configuration using the wall clock.
    pub fn from_config(config: &AppConfig, store: Arc<dyn UserStore>) -> Result<Self, AppError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let hasher = CredentialHasher::new(config.hashing)
            .map_err(|e| AppError::Config(e.to_string()))?;
        let issuer = TokenIssuer::from_config(config, clock.clone())?;

        Ok(Self::new(
            store,
            Arc::new(hasher),
            Arc::new(issuer),
            clock,
            config.store.timeout(),
        ))
    }

    /// 注册：保存凭证，不签发令牌
    pub async fn register(&self, credential: Credential) -> Result<(), AuthError> {
        let Credential {
            identifier,
            password,
        } = credential;
        let identifier = Identifier::normalize(&identifier).ok_or(AuthError::InvalidIdentifier)?;

        if self.call_store("get", self.store.get(&identifier)).await?.is_some() {
            tracing::info!(identifier = %identifier, "Registration rejected: identifier taken");
            return Err(AuthError::IdentifierTaken);
        }

        let password_hash = self
            .run_hasher(move |hasher| hasher.hash(password.expose_secret()))
            .await?
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing failed during registration");
                AuthError::HashingFailure
            })?;

        let record = UserRecord::new(identifier.clone(), password_hash, self.clock.now());
        if !self
            .call_store("insert_if_absent", self.store.insert_if_absent(record))
            .await?
        {
            tracing::info!(identifier = %identifier, "Registration lost insert race");
            return Err(AuthError::IdentifierTaken);
        }

        metrics::counter!("auth.register.success").increment(1);
        tracing::info!(identifier = %identifier, "User registered");
        Ok(())
    }

    /// 登录：未知用户与密码错误返回相同错误，耗时一致
    pub async fn authenticate(&self, credential: Credential) -> Result<SessionToken, AuthError> {
        let Credential {
            identifier,
            password,
        } = credential;

        let record = match Identifier::normalize(&identifier) {
            Some(identifier) => self.call_store("get", self.store.get(&identifier)).await?,
            None => None,
        };

        let Some(record) = record else {
            self.run_hasher(move |hasher| hasher.verify_placeholder(password.expose_secret()))
                .await?;
            return Err(self.reject_credentials());
        };

        let stored = record.password_hash.clone();
        let (verified, needs_rehash) = self
            .run_hasher(move |hasher| {
                let verified = hasher.verify(password.expose_secret(), stored.expose_secret());
                (verified, verified && hasher.needs_rehash(stored.expose_secret()))
            })
            .await?;

        if !verified {
            return Err(self.reject_credentials());
        }

        if needs_rehash {
            tracing::info!(
                identifier = %record.identifier,
                "Stored password hash uses outdated parameters"
            );
        }

        let token = self
            .issuer
            .issue(record.identifier.as_str(), self.issuer.default_ttl())
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to issue session token");
                AuthError::Internal
            })?;

        metrics::counter!("auth.authenticate.success").increment(1);
        tracing::info!(identifier = %record.identifier, "User authenticated");
        Ok(token)
    }

    /// 校验令牌并返回主体标识
    pub async fn authorize(&self, token: &str) -> Result<String, AuthError> {
        self.issuer.validate(token).map_err(|e| {
            let reason = match e {
                TokenError::Expired => "expired",
                TokenError::Invalid => "invalid",
                TokenError::Malformed => "malformed",
                TokenError::InvalidTtl | TokenError::Encoding(_) => "internal",
            };
            metrics::counter!("auth.authorize.failure", "reason" => reason).increment(1);
            tracing::debug!(reason, "Token rejected");
            AuthError::Unauthorized
        })
    }

    fn reject_credentials(&self) -> AuthError {
        metrics::counter!("auth.authenticate.failure").increment(1);
        tracing::debug!("Authentication failed");
        AuthError::InvalidCredentials
    }

    /// Run CPU-bound hashing work on the blocking pool.
    async fn run_hasher<T, F>(&self, work: F) -> Result<T, AuthError>
    where
        F: FnOnce(&CredentialHasher) -> T + Send + 'static,
        T: Send + 'static,
    {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || work(&hasher))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Hashing task failed");
                AuthError::HashingFailure
            })
    }

    async fn call_store<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, AuthError> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(operation, error = %e, "User store call failed");
                Err(AuthError::StoreUnavailable)
            }
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "User store call timed out"
                );
                Err(AuthError::StoreUnavailable)
            }
        }
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("hasher", &self.hasher)
            .field("issuer", &self.issuer)
            .field("store_timeout", &self.store_timeout)
            .finish_non_exhaustive()
    }
}
