//! Authentication and authorization ports.

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::Role;

/// Identity payload embedded in a signed session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl TokenClaims {
    /// Build claims; the expiry is truncated to whole seconds, the resolution
    /// tokens carry.
    pub fn new(
        user_id: i64,
        username: impl Into<String>,
        role: Role,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let expires_at = DateTime::from_timestamp(expires_at.timestamp(), 0).unwrap_or(expires_at);
        Self {
            user_id,
            username: username.into(),
            role,
            expires_at,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Token service trait for signed session tokens.
pub trait TokenService: Send + Sync {
    /// Sign the claims into a compact token.
    fn issue_token(&self, claims: &TokenClaims) -> Result<String, AuthError>;

    /// Verify signature, algorithm and expiry, then decode the claims.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of a freshly issued session.
    fn expiration(&self) -> TimeDelta;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password with a fresh salt.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a stored hash. A mismatch is `Ok(false)`.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing session token")]
    MissingAuth,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
