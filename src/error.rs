//! 统一错误模型
//! `AuthError` 是调用方可见的错误分类，`AppError` 只用于启动阶段的致命错误

use serde::Serialize;
use thiserror::Error;

/// Failure taxonomy surfaced to callers of the auth service.
///
/// Variants intentionally carry no payload: the reason behind
/// `InvalidCredentials` or `Unauthorized` is logged server-side and never
/// leaves this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Identifier already registered")]
    IdentifierTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid identifier")]
    InvalidIdentifier,

    #[error("Password hashing failed")]
    HashingFailure,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("User store unavailable")]
    StoreUnavailable,

    #[error("Internal error")]
    Internal,
}

impl AuthError {
    /// HTTP 风格的状态码
    pub fn code(&self) -> u16 {
        match self {
            AuthError::IdentifierTaken => 409,
            AuthError::InvalidCredentials | AuthError::Unauthorized => 401,
            AuthError::InvalidIdentifier => 400,
            AuthError::StoreUnavailable => 503,
            AuthError::HashingFailure | AuthError::Internal => 500,
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::IdentifierTaken => "Identifier already registered",
            AuthError::InvalidCredentials => "Invalid credentials",
            AuthError::InvalidIdentifier => "Identifier must not be empty",
            AuthError::Unauthorized => "Unauthorized",
            AuthError::StoreUnavailable => "Service temporarily unavailable, retry later",
            AuthError::HashingFailure | AuthError::Internal => "Internal server error",
        }
    }

    /// Whether the caller may retry the same request with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::StoreUnavailable)
    }
}

/// 启动阶段错误
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<crate::db::DbError> for AppError {
    fn from(e: crate::db::DbError) -> Self {
        AppError::Internal(e.to_string())
    }
}

/// 错误响应 DTO
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
    pub retryable: bool,
    pub request_id: String,
}

impl From<AuthError> for ErrorResponse {
    fn from(error: AuthError) -> Self {
        let response = ErrorResponse {
            error: ErrorDetail {
                code: error.code(),
                message: error.user_message().to_string(),
                retryable: error.is_retryable(),
                request_id: uuid::Uuid::new_v4().to_string(),
            },
        };

        tracing::warn!(
            code = response.error.code,
            error = %error,
            request_id = %response.error.request_id,
            "Request rejected"
        );

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AuthError::IdentifierTaken.code(), 409);
        assert_eq!(AuthError::InvalidCredentials.code(), 401);
        assert_eq!(AuthError::Unauthorized.code(), 401);
        assert_eq!(AuthError::StoreUnavailable.code(), 503);
        assert_eq!(AuthError::HashingFailure.code(), 500);
    }

    #[test]
    fn test_only_store_unavailable_is_retryable() {
        assert!(AuthError::StoreUnavailable.is_retryable());
        assert!(!AuthError::InvalidCredentials.is_retryable());
        assert!(!AuthError::HashingFailure.is_retryable());
    }
}
