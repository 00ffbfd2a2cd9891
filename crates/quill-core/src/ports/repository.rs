//! Per-entity repository ports.
//!
//! Implementations are bound to one open transaction; see
//! [`Transaction`](super::Transaction).

use async_trait::async_trait;

use crate::domain::{
    Article, ArticleChanges, ArticleFilter, ArticleMedia, Comment, Like, NewArticle,
    NewArticleMedia, NewComment, NewUser, NewUserProfile, User, UserProfile, UserProfilePhoto,
};
use crate::error::RepoError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. A taken username is `RepoError::Constraint`.
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn find_all(&self) -> Result<Vec<User>, RepoError>;

    /// Persist username, password hash and role.
    async fn update(&self, user: &User) -> Result<User, RepoError>;

    async fn delete(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait UserProfileRepository: Send + Sync {
    async fn create(&self, profile: NewUserProfile) -> Result<UserProfile, RepoError>;

    async fn find_by_user_id(&self, user_id: i64) -> Result<Option<UserProfile>, RepoError>;

    async fn find_all(&self) -> Result<Vec<UserProfile>, RepoError>;

    async fn update(&self, profile: &UserProfile) -> Result<UserProfile, RepoError>;
}

#[async_trait]
pub trait UserProfilePhotoRepository: Send + Sync {
    async fn create(&self, user_id: i64, path: &str) -> Result<UserProfilePhoto, RepoError>;

    async fn find_by_user_id(&self, user_id: i64)
    -> Result<Option<UserProfilePhoto>, RepoError>;

    async fn update(&self, user_id: i64, path: &str) -> Result<UserProfilePhoto, RepoError>;
}

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Insert a draft and return its id.
    async fn create(&self, article: NewArticle) -> Result<i64, RepoError>;

    async fn create_media(&self, media: NewArticleMedia) -> Result<ArticleMedia, RepoError>;

    /// Load one article composed with author name and media.
    async fn find_by_id(&self, id: i64) -> Result<Option<Article>, RepoError>;

    /// Newest first.
    async fn find_all(&self, filter: ArticleFilter) -> Result<Vec<Article>, RepoError>;

    /// Write title, description and content. Never touches the publish flag.
    async fn update(&self, changes: &ArticleChanges) -> Result<(), RepoError>;

    async fn set_published(&self, id: i64, published: bool) -> Result<(), RepoError>;

    async fn delete(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Insert a like. A repeated pair is `RepoError::Constraint`.
    async fn create(&self, user_id: i64, article_id: i64) -> Result<(), RepoError>;

    async fn find_by_user_and_article(
        &self,
        user_id: i64,
        article_id: i64,
    ) -> Result<Option<Like>, RepoError>;

    async fn find_by_article_id(&self, article_id: i64) -> Result<Vec<Like>, RepoError>;

    async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Like>, RepoError>;

    async fn delete(&self, user_id: i64, article_id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: NewComment) -> Result<i64, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, RepoError>;

    /// Oldest first.
    async fn find_by_article_id(&self, article_id: i64) -> Result<Vec<Comment>, RepoError>;

    async fn delete(&self, id: i64) -> Result<(), RepoError>;
}
