pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use password::PasswordHasher;
pub use token::{Claims, Identity, TokenService};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token is malformed")]
    Malformed,

    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token generation failed: {0}")]
    Issue(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Role carried in issued tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
