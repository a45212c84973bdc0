//! 配置系统
//! 从环境变量加载所有配置，使用 Secret 包装敏感信息

use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// 会话令牌签名密钥（无默认值，必须由部署环境提供）
    pub token_secret: Secret<String>,
    /// 会话令牌有效期（秒）
    pub token_ttl_secs: u64,
}

impl SecurityConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

/// Argon2id 工作因子
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct HashingConfig {
    /// 内存开销（KiB）
    pub memory_kib: u32,
    /// 迭代次数
    pub iterations: u32,
    /// 并行度
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// 用户存储单次调用超时（毫秒）
    pub timeout_ms: u64,
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库连接 URL（CLI 的 register/login 必须设置）
    pub url: Option<Secret<String>>,
    /// 最大连接数
    pub max_connections: u32,
    /// 最小连接数
    pub min_connections: u32,
    /// 获取连接超时时间（秒）
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub hashing: HashingConfig,
    pub store: StoreConfig,
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = HashingConfig::default();

        let settings = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("security.token_ttl_secs", 3600)?
            .set_default("hashing.memory_kib", defaults.memory_kib)?
            .set_default("hashing.iterations", defaults.iterations)?
            .set_default("hashing.parallelism", defaults.parallelism)?
            .set_default("store.timeout_ms", 5000)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_secs", 30)?
            // 从环境变量加载配置（前缀为 AUTH_）
            // 值保持字符串原样，数值字段在反序列化时解析
            .add_source(
                Environment::with_prefix("AUTH")
                    .prefix_separator("_")
                    .separator("__"),
            );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        // 签名密钥至少 32 字符（HS256）
        if self.security.token_secret.expose_secret().len() < 32 {
            return Err(ConfigError::Message(
                "token_secret must be at least 32 characters long".to_string(),
            ));
        }

        if self.security.token_ttl_secs < 1 || self.security.token_ttl_secs > 86400 {
            return Err(ConfigError::Message(
                "token_ttl_secs must be between 1 and 86400".to_string(),
            ));
        }

        if self.hashing.iterations < 1 || self.hashing.parallelism < 1 {
            return Err(ConfigError::Message(
                "hashing.iterations and hashing.parallelism must be >= 1".to_string(),
            ));
        }

        if self.store.timeout_ms < 1 {
            return Err(ConfigError::Message(
                "store.timeout_ms must be >= 1".to_string(),
            ));
        }

        if self.database.max_connections < self.database.min_connections {
            return Err(ConfigError::Message(
                "max_connections must be >= min_connections".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const SECRET_VAR: &str = "AUTH_SECURITY__TOKEN_SECRET";

    fn clear_env() {
        for key in [
            SECRET_VAR,
            "AUTH_SECURITY__TOKEN_TTL_SECS",
            "AUTH_LOGGING__LEVEL",
            "AUTH_HASHING__MEMORY_KIB",
            "AUTH_DATABASE__URL",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();
        std::env::set_var(SECRET_VAR, "test_secret_key_32_characters_long!");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.security.token_ttl(), Duration::from_secs(3600));
        assert_eq!(config.hashing, HashingConfig::default());
        assert_eq!(config.store.timeout(), Duration::from_millis(5000));
        assert!(config.database.url.is_none());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_secret_is_fatal() {
        clear_env();

        assert!(AppConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn test_short_secret_rejected() {
        clear_env();
        std::env::set_var(SECRET_VAR, "too-short");

        assert!(AppConfig::from_env().is_err());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_overrides_from_env() {
        clear_env();
        std::env::set_var(SECRET_VAR, "test_secret_key_32_characters_long!");
        std::env::set_var("AUTH_SECURITY__TOKEN_TTL_SECS", "600");
        std::env::set_var("AUTH_HASHING__MEMORY_KIB", "19456");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.security.token_ttl_secs, 600);
        assert_eq!(config.hashing.memory_kib, 19456);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_numeric_secret_loaded_verbatim() {
        clear_env();
        let secret = "1234567890123456789012345678901234567890";
        std::env::set_var(SECRET_VAR, secret);

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.security.token_secret.expose_secret(), secret);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_validation_invalid_log_level() {
        clear_env();
        std::env::set_var(SECRET_VAR, "test_secret_key_32_characters_long!");
        std::env::set_var("AUTH_LOGGING__LEVEL", "invalid");

        assert!(AppConfig::from_env().is_err());

        clear_env();
    }
}
