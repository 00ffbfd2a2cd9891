use std::sync::Arc;

use crate::domain::Like;
use crate::error::{DomainError, DomainResult, RepoError};
use crate::policy::Actor;
use crate::ports::{Transaction, TransactionManager, commit_or_rollback};

pub struct LikeService {
    db: Arc<dyn TransactionManager>,
}

impl LikeService {
    pub fn new(db: Arc<dyn TransactionManager>) -> Self {
        Self { db }
    }

    /// Like an article. The unique (user, article) index is the only guard:
    /// a repeated like fails with `Conflict`.
    pub async fn create(&self, actor: &Actor, article_id: i64) -> DomainResult<Like> {
        let tx = self.db.begin().await?;
        let result = Self::create_in(tx.as_ref(), actor.user_id, article_id).await;
        let like = commit_or_rollback(tx, result).await?;

        tracing::debug!(user_id = actor.user_id, article_id, "Article liked");
        Ok(like)
    }

    async fn create_in(tx: &dyn Transaction, user_id: i64, article_id: i64) -> DomainResult<Like> {
        let likes = tx.likes();
        likes
            .create(user_id, article_id)
            .await
            .map_err(|err| match err {
                RepoError::Constraint(_) => {
                    DomainError::Conflict("article is already liked".into())
                }
                other => other.into(),
            })?;

        likes
            .find_by_user_and_article(user_id, article_id)
            .await?
            .ok_or(DomainError::NotFound("like"))
    }

    /// Remove the actor's own like; there must be one.
    pub async fn delete(&self, actor: &Actor, article_id: i64) -> DomainResult<()> {
        let tx = self.db.begin().await?;
        let result = Self::delete_in(tx.as_ref(), actor.user_id, article_id).await;
        commit_or_rollback(tx, result).await?;

        tracing::debug!(user_id = actor.user_id, article_id, "Article unliked");
        Ok(())
    }

    async fn delete_in(tx: &dyn Transaction, user_id: i64, article_id: i64) -> DomainResult<()> {
        let likes = tx.likes();
        if likes
            .find_by_user_and_article(user_id, article_id)
            .await?
            .is_none()
        {
            return Err(DomainError::NotFound("like"));
        }
        likes.delete(user_id, article_id).await?;
        Ok(())
    }

    pub async fn find_by_article_id(&self, article_id: i64) -> DomainResult<Vec<Like>> {
        let tx = self.db.begin().await?;
        let result = tx
            .likes()
            .find_by_article_id(article_id)
            .await
            .map_err(Into::into);
        commit_or_rollback(tx, result).await
    }

    pub async fn find_by_user_id(&self, user_id: i64) -> DomainResult<Vec<Like>> {
        let tx = self.db.begin().await?;
        let result = tx
            .likes()
            .find_by_user_id(user_id)
            .await
            .map_err(Into::into);
        commit_or_rollback(tx, result).await
    }
}
