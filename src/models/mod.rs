//! 数据模型模块

pub mod auth;
pub mod user;

pub use auth::{Credential, SessionToken};
pub use user::{Identifier, UserRecord};
