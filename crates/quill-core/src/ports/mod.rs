//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod repository;
mod transaction;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use repository::{
    ArticleRepository, CommentRepository, LikeRepository, UserProfilePhotoRepository,
    UserProfileRepository, UserRepository,
};
pub use transaction::{Transaction, TransactionManager, commit_or_rollback};
