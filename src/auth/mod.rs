//! Credential hashing and session tokens

pub mod clock;
pub mod jwt;
pub mod password;

pub use clock::{Clock, ManualClock, SystemClock};
pub use jwt::{Claims, TokenError, TokenIssuer};
pub use password::{CredentialHasher, HashError};
