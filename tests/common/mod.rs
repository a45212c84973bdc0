//! 测试公共模块
//! 提供测试辅助函数和测试工具

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use credential_core::{
    auth::{Clock, CredentialHasher, ManualClock, TokenIssuer},
    config::{AppConfig, DatabaseConfig, HashingConfig, LoggingConfig, SecurityConfig, StoreConfig},
    repository::{InMemoryUserStore, UserStore},
    AuthService,
};
use secrecy::Secret;
use std::{sync::Arc, time::Duration};

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";

/// 低开销哈希参数，仅用于测试
pub fn test_hashing() -> HashingConfig {
    HashingConfig {
        memory_kib: 4096,
        iterations: 1,
        parallelism: 1,
    }
}

/// 创建测试配置
pub fn create_test_config() -> AppConfig {
    AppConfig {
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            token_secret: Secret::new(TEST_SECRET.to_string()),
            token_ttl_secs: 3600,
        },
        hashing: test_hashing(),
        store: StoreConfig { timeout_ms: 1000 },
        database: DatabaseConfig {
            url: std::env::var("TEST_DATABASE_URL").ok().map(Secret::new),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 5,
        },
    }
}

pub fn test_clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
}

pub fn test_issuer(clock: &ManualClock) -> TokenIssuer {
    TokenIssuer::new(
        &Secret::new(TEST_SECRET.to_string()),
        Duration::from_secs(3600),
        Arc::new(clock.clone()),
    )
    .expect("test issuer")
}

/// Service over the given store with a logical clock
pub fn service_with_store(store: Arc<dyn UserStore>, store_timeout: Duration) -> (AuthService, ManualClock) {
    let clock = test_clock();
    let hasher = CredentialHasher::new(test_hashing()).expect("test hasher");
    let issuer = test_issuer(&clock);
    let service = AuthService::new(
        store,
        Arc::new(hasher),
        Arc::new(issuer),
        Arc::new(clock.clone()) as Arc<dyn Clock>,
        store_timeout,
    );
    (service, clock)
}

pub fn test_service() -> (AuthService, Arc<InMemoryUserStore>, ManualClock) {
    let store = Arc::new(InMemoryUserStore::new());
    let (service, clock) = service_with_store(store.clone(), Duration::from_secs(1));
    (service, store, clock)
}

/// Replace one character of the signature part
pub fn tamper_signature(token: &str) -> String {
    let (head, signature) = token.rsplit_once('.').expect("three-part token");
    let mut chars: Vec<char> = signature.chars().collect();
    chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
    format!("{}.{}", head, chars.into_iter().collect::<String>())
}
