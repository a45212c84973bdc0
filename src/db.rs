//! 用户表所在的 PostgreSQL 连接
//! 连接池、建表，以及 CLI 使用的一步式打开

use crate::config::DatabaseConfig;
use secrecy::ExposeSecret;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database.url is not set")]
    MissingUrl,

    #[error("Cannot connect to user database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Cannot prepare users table: {0}")]
    Schema(#[source] sqlx::Error),
}

/// 创建连接池，获取连接前先测试连通性
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let url = config.url.as_ref().ok_or(DbError::MissingUrl)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .test_before_acquire(true)
        .connect(url.expose_secret())
        .await
        .map_err(DbError::Connect)?;

    tracing::debug!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "User database pool ready"
    );

    Ok(pool)
}

/// 建表（幂等）。identifier 为主键，保证插入的原子唯一性
pub async fn ensure_schema(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            identifier    TEXT PRIMARY KEY,
            password_hash TEXT NOT NULL,
            created_at    TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(DbError::Schema)?;

    Ok(())
}

/// 连接、建表，并确认 users 表可读
pub async fn open(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let pool = create_pool(config).await?;
    ensure_schema(&pool).await?;

    let (users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .map_err(DbError::Schema)?;
    tracing::info!(users, "User database opened");

    Ok(pool)
}
