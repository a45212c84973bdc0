//! 认证核心库
//! 凭证哈希、会话令牌签发与校验、注册/登录编排

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod telemetry;

pub use error::{AppError, AuthError};
pub use services::AuthService;
