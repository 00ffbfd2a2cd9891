//! Article authoring and the Draft/Published workflow.

use std::sync::Arc;

use validator::Validate;

use crate::domain::{
    Article, ArticleChanges, ArticleFilter, NewArticle, NewArticleMedia, Role, Visibility,
};
use crate::error::{DomainError, DomainResult};
use crate::policy::Actor;
use crate::ports::{Transaction, TransactionManager, commit_or_rollback};
use crate::validation::{ensure_valid, field_messages, validate};

#[derive(Debug, Clone, Validate)]
pub struct MediaInput {
    #[validate(length(min = 1, max = 100, message = "media type is required"))]
    pub media_type: String,
    #[validate(length(min = 1, max = 255, message = "media path is required"))]
    pub path: String,
}

/// Fields accepted when creating an article. Any client-side publish flag is
/// dropped before reaching this type.
#[derive(Debug, Clone, Validate)]
pub struct CreateArticleInput {
    #[validate(length(min = 1, max = 255, message = "title must be 1 to 255 characters"))]
    pub title: String,
    pub description: String,
    pub content: String,
    pub media: Vec<MediaInput>,
}

#[derive(Debug, Clone, Validate)]
pub struct UpdateArticleInput {
    #[validate(length(min = 1, max = 255, message = "title must be 1 to 255 characters"))]
    pub title: String,
    pub description: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    pub is_published: bool,
}

pub struct ArticleService {
    db: Arc<dyn TransactionManager>,
}

impl ArticleService {
    pub fn new(db: Arc<dyn TransactionManager>) -> Self {
        Self { db }
    }

    /// Create a draft owned by the actor, with its media, in one transaction.
    pub async fn create(&self, actor: &Actor, input: CreateArticleInput) -> DomainResult<Article> {
        let mut messages = field_messages(&input);
        for media in &input.media {
            messages.extend(field_messages(media));
        }
        messages.sort();
        messages.dedup();
        ensure_valid(messages)?;

        let tx = self.db.begin().await?;
        let result = Self::create_in(tx.as_ref(), actor.user_id, input).await;
        let article = commit_or_rollback(tx, result).await?;

        tracing::info!(article_id = article.id, user_id = actor.user_id, "Article created");
        Ok(article)
    }

    async fn create_in(
        tx: &dyn Transaction,
        user_id: i64,
        input: CreateArticleInput,
    ) -> DomainResult<Article> {
        let articles = tx.articles();
        let id = articles
            .create(NewArticle {
                user_id,
                title: input.title,
                description: input.description,
                content: input.content,
            })
            .await?;

        for media in input.media {
            articles
                .create_media(NewArticleMedia {
                    article_id: id,
                    media_type: media.media_type,
                    path: media.path,
                })
                .await?;
        }

        Self::load(tx, id).await
    }

    /// Edit title, description and content.
    ///
    /// Non-admins may only edit their own articles and may never ask for
    /// publication here; the publish flag is left as stored either way.
    pub async fn update(
        &self,
        actor: &Actor,
        id: i64,
        input: UpdateArticleInput,
    ) -> DomainResult<Article> {
        validate(&input)?;

        let tx = self.db.begin().await?;
        let result = Self::update_in(tx.as_ref(), actor, id, input).await;
        let article = commit_or_rollback(tx, result).await?;

        tracing::info!(article_id = id, user_id = actor.user_id, "Article updated");
        Ok(article)
    }

    async fn update_in(
        tx: &dyn Transaction,
        actor: &Actor,
        id: i64,
        input: UpdateArticleInput,
    ) -> DomainResult<Article> {
        let existing = Self::load(tx, id).await?;

        if !actor.is_admin() && input.is_published {
            return Err(DomainError::unauthorized(
                "you are not allowed to publish this article",
            ));
        }
        if !actor.can_manage(existing.user_id) {
            return Err(DomainError::unauthorized(
                "you are not allowed to edit this article",
            ));
        }

        tx.articles()
            .update(&ArticleChanges {
                id,
                title: input.title,
                description: input.description,
                content: input.content,
            })
            .await?;

        Self::load(tx, id).await
    }

    pub async fn delete(&self, actor: &Actor, id: i64) -> DomainResult<()> {
        let tx = self.db.begin().await?;
        let result = Self::delete_in(tx.as_ref(), actor, id).await;
        commit_or_rollback(tx, result).await?;

        tracing::info!(article_id = id, user_id = actor.user_id, "Article deleted");
        Ok(())
    }

    async fn delete_in(tx: &dyn Transaction, actor: &Actor, id: i64) -> DomainResult<()> {
        let existing = Self::load(tx, id).await?;
        if !actor.can_manage(existing.user_id) {
            return Err(DomainError::unauthorized(
                "you are not allowed to delete this article",
            ));
        }
        tx.articles().delete(id).await?;
        Ok(())
    }

    /// Admin-only. Publishing a published article is a successful no-op.
    pub async fn publish(&self, actor: &Actor, id: i64) -> DomainResult<Article> {
        self.transition(actor, id, Visibility::Published).await
    }

    /// Admin-only. Unpublishing a draft is a successful no-op.
    pub async fn unpublish(&self, actor: &Actor, id: i64) -> DomainResult<Article> {
        self.transition(actor, id, Visibility::Draft).await
    }

    async fn transition(
        &self,
        actor: &Actor,
        id: i64,
        target: Visibility,
    ) -> DomainResult<Article> {
        actor.require_role(Role::Admin)?;

        let tx = self.db.begin().await?;
        let result = Self::transition_in(tx.as_ref(), id, target).await;
        let article = commit_or_rollback(tx, result).await?;

        tracing::info!(article_id = id, state = ?target, "Article visibility set");
        Ok(article)
    }

    async fn transition_in(
        tx: &dyn Transaction,
        id: i64,
        target: Visibility,
    ) -> DomainResult<Article> {
        let article = Self::load(tx, id).await?;
        if article.visibility() == target {
            return Ok(article);
        }
        tx.articles().set_published(id, target.is_published()).await?;
        Self::load(tx, id).await
    }

    /// Drafts are visible only to their author and to admins.
    pub async fn find_by_id(&self, viewer: Option<&Actor>, id: i64) -> DomainResult<Article> {
        let tx = self.db.begin().await?;
        let result = Self::load(tx.as_ref(), id).await;
        let article = commit_or_rollback(tx, result).await?;

        let visible = article.is_published
            || viewer.is_some_and(|actor| actor.can_manage(article.user_id));
        if !visible {
            return Err(DomainError::NotFound("article"));
        }
        Ok(article)
    }

    pub async fn find_all_published(&self) -> DomainResult<Vec<Article>> {
        self.list(ArticleFilter::with_visibility(Visibility::Published))
            .await
    }

    pub async fn find_all_published_by_user(&self, user_id: i64) -> DomainResult<Vec<Article>> {
        self.list(ArticleFilter::with_visibility(Visibility::Published).by_author(user_id))
            .await
    }

    pub async fn find_all_unpublished(&self, actor: &Actor) -> DomainResult<Vec<Article>> {
        actor.require_role(Role::Admin)?;
        self.list(ArticleFilter::with_visibility(Visibility::Draft))
            .await
    }

    /// A user's drafts, for that user or an admin.
    pub async fn find_all_unpublished_by_user(
        &self,
        actor: &Actor,
        user_id: i64,
    ) -> DomainResult<Vec<Article>> {
        if !actor.can_manage(user_id) {
            return Err(DomainError::Forbidden);
        }
        self.list(ArticleFilter::with_visibility(Visibility::Draft).by_author(user_id))
            .await
    }

    async fn list(&self, filter: ArticleFilter) -> DomainResult<Vec<Article>> {
        let tx = self.db.begin().await?;
        let result = tx.articles().find_all(filter).await.map_err(Into::into);
        commit_or_rollback(tx, result).await
    }

    async fn load(tx: &dyn Transaction, id: i64) -> DomainResult<Article> {
        tx.articles()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("article"))
    }
}
