//! Domain-level error types.

use thiserror::Error;

use crate::ports::AuthError;

/// Domain errors - business logic failures.
///
/// Every service operation returns one of these kinds; the HTTP boundary maps
/// each kind to exactly one status code.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::InvalidCredentials(message.into())
    }
}

/// Result alias used by every service.
pub type DomainResult<T> = Result<T, DomainError>;

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Unique constraint violation: {0}")]
    Constraint(String),

    #[error("Foreign key violation: {0}")]
    ForeignKey(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => DomainError::NotFound("record"),
            RepoError::Constraint(detail) => DomainError::Conflict(detail),
            RepoError::ForeignKey(_) => {
                DomainError::InvalidParameter("referenced record does not exist".to_string())
            }
            RepoError::Connection(detail) | RepoError::Query(detail) => {
                DomainError::Internal(detail)
            }
        }
    }
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::HashingError(detail) => DomainError::Internal(detail),
            AuthError::InsufficientPermissions => DomainError::Forbidden,
            AuthError::InvalidCredentials => {
                DomainError::unauthorized("invalid username or password")
            }
            AuthError::TokenExpired => DomainError::unauthorized("session has expired"),
            AuthError::InvalidToken(_) => DomainError::unauthorized("invalid session token"),
            AuthError::MissingAuth => DomainError::unauthorized("authentication required"),
        }
    }
}
