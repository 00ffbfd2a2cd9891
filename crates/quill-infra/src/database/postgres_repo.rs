//! PostgreSQL repository implementations.
//!
//! All six repository ports are implemented on [`PostgresTransaction`], so a
//! service's statements always run on the transaction it opened.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, NotSet, QueryFilter,
    QueryOrder, QueryTrait, Set,
};

use quill_core::domain::{
    Article, ArticleChanges, ArticleFilter, ArticleMedia, Comment, Like, NewArticle,
    NewArticleMedia, NewComment, NewUser, NewUserProfile, User, UserProfile, UserProfilePhoto,
};
use quill_core::error::RepoError;
use quill_core::ports::{
    ArticleRepository, CommentRepository, LikeRepository, UserProfilePhotoRepository,
    UserProfileRepository, UserRepository,
};

use super::entity::{
    article, article_media, comment, like, user, user_profile, user_profile_photo,
};
use super::postgres_base::{PostgresTransaction, map_db_err};

fn now() -> sea_orm::prelude::DateTimeWithTimeZone {
    Utc::now().fixed_offset()
}

#[async_trait]
impl UserRepository for PostgresTransaction {
    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let model = user::ActiveModel {
            id: NotSet,
            username: Set(new_user.username),
            password_hash: Set(new_user.password_hash),
            role: Set(new_user.role.into()),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&self.txn)
        .await
        .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_id = id, "Finding user by id");

        let result = user::Entity::find_by_id(id)
            .one(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username, "Finding user by username");

        let result = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        let result = user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn update(&self, existing: &User) -> Result<User, RepoError> {
        let model = user::ActiveModel {
            id: Set(existing.id),
            username: Set(existing.username.clone()),
            password_hash: Set(existing.password_hash.clone()),
            role: Set(existing.role.into()),
            created_at: NotSet,
            updated_at: Set(now()),
        }
        .update(&self.txn)
        .await
        .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let result = user::Entity::delete_by_id(id)
            .exec(&self.txn)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl UserProfileRepository for PostgresTransaction {
    async fn create(&self, profile: NewUserProfile) -> Result<UserProfile, RepoError> {
        let model = user_profile::ActiveModel {
            user_id: Set(profile.user_id),
            full_name: Set(profile.full_name),
            gender: Set(None),
            birth_date: Set(None),
            phone_number: Set(None),
            address: Set(None),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&self.txn)
        .await
        .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn find_by_user_id(&self, user_id: i64) -> Result<Option<UserProfile>, RepoError> {
        let result = user_profile::Entity::find_by_id(user_id)
            .one(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_all(&self) -> Result<Vec<UserProfile>, RepoError> {
        let result = user_profile::Entity::find()
            .order_by_asc(user_profile::Column::UserId)
            .all(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn update(&self, profile: &UserProfile) -> Result<UserProfile, RepoError> {
        let model = user_profile::ActiveModel {
            user_id: Set(profile.user_id),
            full_name: Set(profile.full_name.clone()),
            gender: Set(profile.gender.clone()),
            birth_date: Set(profile.birth_date.clone()),
            phone_number: Set(profile.phone_number.clone()),
            address: Set(profile.address.clone()),
            created_at: NotSet,
            updated_at: Set(now()),
        }
        .update(&self.txn)
        .await
        .map_err(map_db_err)?;

        Ok(model.into())
    }
}

#[async_trait]
impl UserProfilePhotoRepository for PostgresTransaction {
    async fn create(&self, user_id: i64, path: &str) -> Result<UserProfilePhoto, RepoError> {
        let model = user_profile_photo::ActiveModel {
            user_id: Set(user_id),
            path: Set(path.to_string()),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&self.txn)
        .await
        .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn find_by_user_id(
        &self,
        user_id: i64,
    ) -> Result<Option<UserProfilePhoto>, RepoError> {
        let result = user_profile_photo::Entity::find_by_id(user_id)
            .one(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn update(&self, user_id: i64, path: &str) -> Result<UserProfilePhoto, RepoError> {
        let model = user_profile_photo::ActiveModel {
            user_id: Set(user_id),
            path: Set(path.to_string()),
            created_at: NotSet,
            updated_at: Set(now()),
        }
        .update(&self.txn)
        .await
        .map_err(map_db_err)?;

        Ok(model.into())
    }
}

#[async_trait]
impl ArticleRepository for PostgresTransaction {
    async fn create(&self, article: NewArticle) -> Result<i64, RepoError> {
        let model = article::ActiveModel {
            id: NotSet,
            user_id: Set(article.user_id),
            title: Set(article.title),
            description: Set(article.description),
            content: Set(article.content),
            is_published: Set(false),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&self.txn)
        .await
        .map_err(map_db_err)?;

        Ok(model.id)
    }

    async fn create_media(&self, media: NewArticleMedia) -> Result<ArticleMedia, RepoError> {
        let model = article_media::ActiveModel {
            id: NotSet,
            article_id: Set(media.article_id),
            media_type: Set(media.media_type),
            path: Set(media.path),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&self.txn)
        .await
        .map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Article>, RepoError> {
        tracing::debug!(article_id = id, "Finding article by id");

        let Some(row) = article::Entity::find_by_id(id)
            .one(&self.txn)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        Ok(compose(&self.txn, vec![row]).await?.pop())
    }

    async fn find_all(&self, filter: ArticleFilter) -> Result<Vec<Article>, RepoError> {
        let rows = article::Entity::find()
            .apply_if(filter.visibility, |query, visibility| {
                query.filter(article::Column::IsPublished.eq(visibility.is_published()))
            })
            .apply_if(filter.author_id, |query, author_id| {
                query.filter(article::Column::UserId.eq(author_id))
            })
            .order_by_desc(article::Column::CreatedAt)
            .order_by_desc(article::Column::Id)
            .all(&self.txn)
            .await
            .map_err(map_db_err)?;

        compose(&self.txn, rows).await
    }

    async fn update(&self, changes: &ArticleChanges) -> Result<(), RepoError> {
        let result = article::Entity::update_many()
            .col_expr(article::Column::Title, Expr::value(changes.title.clone()))
            .col_expr(
                article::Column::Description,
                Expr::value(changes.description.clone()),
            )
            .col_expr(article::Column::Content, Expr::value(changes.content.clone()))
            .col_expr(article::Column::UpdatedAt, Expr::value(now()))
            .filter(article::Column::Id.eq(changes.id))
            .exec(&self.txn)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn set_published(&self, id: i64, published: bool) -> Result<(), RepoError> {
        let result = article::Entity::update_many()
            .col_expr(article::Column::IsPublished, Expr::value(published))
            .col_expr(article::Column::UpdatedAt, Expr::value(now()))
            .filter(article::Column::Id.eq(id))
            .exec(&self.txn)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let result = article::Entity::delete_by_id(id)
            .exec(&self.txn)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

/// Attach media and author names to article rows, keeping row order.
async fn compose(
    txn: &DatabaseTransaction,
    rows: Vec<article::Model>,
) -> Result<Vec<Article>, RepoError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let article_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let mut media: HashMap<i64, Vec<ArticleMedia>> = HashMap::new();
    for item in article_media::Entity::find()
        .filter(article_media::Column::ArticleId.is_in(article_ids))
        .order_by_asc(article_media::Column::Id)
        .all(txn)
        .await
        .map_err(map_db_err)?
    {
        media.entry(item.article_id).or_default().push(item.into());
    }

    let author_ids: Vec<i64> = rows.iter().map(|row| row.user_id).collect();
    let authors: HashMap<i64, String> = user_profile::Entity::find()
        .filter(user_profile::Column::UserId.is_in(author_ids))
        .all(txn)
        .await
        .map_err(map_db_err)?
        .into_iter()
        .map(|profile| (profile.user_id, profile.full_name))
        .collect();

    Ok(rows
        .into_iter()
        .map(|row| Article {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            content: row.content,
            author: authors.get(&row.user_id).cloned().unwrap_or_default(),
            is_published: row.is_published,
            media: media.remove(&row.id).unwrap_or_default(),
            created_at: row.created_at.into(),
            updated_at: row.updated_at.into(),
        })
        .collect())
}

#[async_trait]
impl LikeRepository for PostgresTransaction {
    async fn create(&self, user_id: i64, article_id: i64) -> Result<(), RepoError> {
        like::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            article_id: Set(article_id),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&self.txn)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn find_by_user_and_article(
        &self,
        user_id: i64,
        article_id: i64,
    ) -> Result<Option<Like>, RepoError> {
        let result = like::Entity::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::ArticleId.eq(article_id))
            .one(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_article_id(&self, article_id: i64) -> Result<Vec<Like>, RepoError> {
        let result = like::Entity::find()
            .filter(like::Column::ArticleId.eq(article_id))
            .order_by_asc(like::Column::Id)
            .all(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Like>, RepoError> {
        let result = like::Entity::find()
            .filter(like::Column::UserId.eq(user_id))
            .order_by_asc(like::Column::Id)
            .all(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, user_id: i64, article_id: i64) -> Result<(), RepoError> {
        let result = like::Entity::delete_many()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::ArticleId.eq(article_id))
            .exec(&self.txn)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for PostgresTransaction {
    async fn create(&self, new_comment: NewComment) -> Result<i64, RepoError> {
        let model = comment::ActiveModel {
            id: NotSet,
            user_id: Set(new_comment.user_id),
            article_id: Set(new_comment.article_id),
            body: Set(new_comment.body),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&self.txn)
        .await
        .map_err(map_db_err)?;

        Ok(model.id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, RepoError> {
        let result = comment::Entity::find_by_id(id)
            .one(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_article_id(&self, article_id: i64) -> Result<Vec<Comment>, RepoError> {
        let result = comment::Entity::find()
            .filter(comment::Column::ArticleId.eq(article_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&self.txn)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let result = comment::Entity::delete_by_id(id)
            .exec(&self.txn)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
