use std::sync::Arc;

use validator::Validate;

use crate::domain::{Comment, NewComment};
use crate::error::{DomainError, DomainResult};
use crate::policy::Actor;
use crate::ports::{Transaction, TransactionManager, commit_or_rollback};
use crate::validation::validate;

#[derive(Debug, Clone, Validate)]
pub struct CreateCommentInput {
    #[validate(length(min = 1, message = "comment must not be empty"))]
    pub body: String,
}

pub struct CommentService {
    db: Arc<dyn TransactionManager>,
}

impl CommentService {
    pub fn new(db: Arc<dyn TransactionManager>) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        actor: &Actor,
        article_id: i64,
        input: CreateCommentInput,
    ) -> DomainResult<Comment> {
        validate(&input)?;

        let tx = self.db.begin().await?;
        let result = Self::create_in(tx.as_ref(), actor.user_id, article_id, input.body).await;
        let comment = commit_or_rollback(tx, result).await?;

        tracing::debug!(comment_id = comment.id, article_id, "Comment created");
        Ok(comment)
    }

    async fn create_in(
        tx: &dyn Transaction,
        user_id: i64,
        article_id: i64,
        body: String,
    ) -> DomainResult<Comment> {
        let comments = tx.comments();
        let id = comments
            .create(NewComment {
                user_id,
                article_id,
                body,
            })
            .await?;

        comments
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("comment"))
    }

    /// Only the comment's author may delete it.
    pub async fn delete(&self, actor: &Actor, comment_id: i64) -> DomainResult<()> {
        let tx = self.db.begin().await?;
        let result = Self::delete_in(tx.as_ref(), actor.user_id, comment_id).await;
        commit_or_rollback(tx, result).await?;

        tracing::debug!(comment_id, user_id = actor.user_id, "Comment deleted");
        Ok(())
    }

    async fn delete_in(tx: &dyn Transaction, user_id: i64, comment_id: i64) -> DomainResult<()> {
        let comments = tx.comments();
        let comment = comments
            .find_by_id(comment_id)
            .await?
            .ok_or(DomainError::NotFound("comment"))?;

        if !comment.is_authored_by(user_id) {
            return Err(DomainError::unauthorized(
                "you cannot delete another user's comment",
            ));
        }

        comments.delete(comment.id).await?;
        Ok(())
    }

    pub async fn find_by_article_id(&self, article_id: i64) -> DomainResult<Vec<Comment>> {
        let tx = self.db.begin().await?;
        let result = tx
            .comments()
            .find_by_article_id(article_id)
            .await
            .map_err(Into::into);
        commit_or_rollback(tx, result).await
    }
}
