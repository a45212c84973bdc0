//! PostgreSQL user store (数据库访问层)

use super::{StoreError, UserStore};
use crate::models::user::{Identifier, UserRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::{PgPool, Row};

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    /// 根据标识查找用户
    async fn get(&self, identifier: &Identifier) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT identifier, password_hash, created_at FROM users WHERE identifier = $1",
        )
        .bind(identifier.as_str())
        .fetch_optional(&self.db)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: String = row.try_get("identifier")?;
        let identifier = Identifier::normalize(&raw)
            .ok_or_else(|| StoreError::Corrupt("empty identifier in users table".to_string()))?;
        let password_hash: String = row.try_get("password_hash")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        Ok(Some(UserRecord::new(identifier, password_hash, created_at)))
    }

    /// 创建用户（标识已存在时不写入）
    async fn insert_if_absent(&self, record: UserRecord) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (identifier, password_hash, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (identifier) DO NOTHING
            "#,
        )
        .bind(record.identifier.as_str())
        .bind(record.password_hash.expose_secret())
        .bind(record.created_at)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
