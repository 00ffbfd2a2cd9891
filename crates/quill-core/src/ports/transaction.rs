//! Transaction port - one unit of work per service call.

use async_trait::async_trait;

use super::repository::{
    ArticleRepository, CommentRepository, LikeRepository, UserProfilePhotoRepository,
    UserProfileRepository, UserRepository,
};
use crate::error::{DomainResult, RepoError};

/// An open database transaction.
///
/// The repositories it hands out run every statement on this transaction.
/// Dropping it without calling [`commit`](Transaction::commit) rolls it back,
/// which covers early returns, cancelled futures and panics.
#[async_trait]
pub trait Transaction: Send + Sync {
    fn users(&self) -> &dyn UserRepository;

    fn profiles(&self) -> &dyn UserProfileRepository;

    fn photos(&self) -> &dyn UserProfilePhotoRepository;

    fn articles(&self) -> &dyn ArticleRepository;

    fn likes(&self) -> &dyn LikeRepository;

    fn comments(&self) -> &dyn CommentRepository;

    async fn commit(self: Box<Self>) -> Result<(), RepoError>;

    async fn rollback(self: Box<Self>) -> Result<(), RepoError>;
}

/// Source of transactions, shared by all services.
#[async_trait]
pub trait TransactionManager: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn Transaction>, RepoError>;
}

/// Close a transaction according to the outcome of the work done in it:
/// commit on success, roll back on failure.
pub async fn commit_or_rollback<T>(
    tx: Box<dyn Transaction>,
    result: DomainResult<T>,
) -> DomainResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
