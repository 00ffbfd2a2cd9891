//! In-memory transactional store.
//!
//! Used when no database is configured and by the service tests. A
//! transaction holds the store lock for its whole life and works on a copy of
//! the tables; only `commit` writes the copy back. Unique, foreign key and
//! cascade rules mirror the PostgreSQL schema.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use quill_core::domain::{
    Article, ArticleChanges, ArticleFilter, ArticleMedia, Comment, Like, NewArticle,
    NewArticleMedia, NewComment, NewUser, NewUserProfile, User, UserProfile, UserProfilePhoto,
};
use quill_core::error::RepoError;
use quill_core::ports::{
    ArticleRepository, CommentRepository, LikeRepository, Transaction, TransactionManager,
    UserProfilePhotoRepository, UserProfileRepository, UserRepository,
};

#[derive(Debug, Clone)]
struct ArticleRow {
    id: i64,
    user_id: i64,
    title: String,
    description: String,
    content: String,
    is_published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct Sequences {
    users: i64,
    articles: i64,
    media: i64,
    likes: i64,
    comments: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    profiles: BTreeMap<i64, UserProfile>,
    photos: BTreeMap<i64, UserProfilePhoto>,
    articles: BTreeMap<i64, ArticleRow>,
    media: BTreeMap<i64, ArticleMedia>,
    likes: BTreeMap<i64, Like>,
    comments: BTreeMap<i64, Comment>,
    seq: Sequences,
}

impl Tables {
    fn require_user(&self, user_id: i64) -> Result<(), RepoError> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(RepoError::ForeignKey(format!("user {user_id} does not exist")))
        }
    }

    fn require_article(&self, article_id: i64) -> Result<(), RepoError> {
        if self.articles.contains_key(&article_id) {
            Ok(())
        } else {
            Err(RepoError::ForeignKey(format!(
                "article {article_id} does not exist"
            )))
        }
    }

    fn username_taken(&self, username: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && Some(u.id) != except)
    }

    fn remove_article(&mut self, article_id: i64) {
        self.articles.remove(&article_id);
        self.media.retain(|_, m| m.article_id != article_id);
        self.likes.retain(|_, l| l.article_id != article_id);
        self.comments.retain(|_, c| c.article_id != article_id);
    }

    fn remove_user(&mut self, user_id: i64) {
        self.users.remove(&user_id);
        self.profiles.remove(&user_id);
        self.photos.remove(&user_id);

        let owned: Vec<i64> = self
            .articles
            .values()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.id)
            .collect();
        for article_id in owned {
            self.remove_article(article_id);
        }

        self.likes.retain(|_, l| l.user_id != user_id);
        self.comments.retain(|_, c| c.user_id != user_id);
    }

    fn compose(&self, row: &ArticleRow) -> Article {
        Article {
            id: row.id,
            user_id: row.user_id,
            title: row.title.clone(),
            description: row.description.clone(),
            content: row.content.clone(),
            author: self
                .profiles
                .get(&row.user_id)
                .map(|p| p.full_name.clone())
                .unwrap_or_default(),
            is_published: row.is_published,
            media: self
                .media
                .values()
                .filter(|m| m.article_id == row.id)
                .cloned()
                .collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Shared in-memory database.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<AsyncMutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionManager for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>, RepoError> {
        let committed = Arc::clone(&self.tables).lock_owned().await;
        let working = Mutex::new(committed.clone());
        Ok(Box::new(InMemoryTransaction { committed, working }))
    }
}

/// Dropping it without `commit` discards the working copy.
pub struct InMemoryTransaction {
    committed: OwnedMutexGuard<Tables>,
    working: Mutex<Tables>,
}

impl InMemoryTransaction {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.working.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Transaction for InMemoryTransaction {
    fn users(&self) -> &dyn UserRepository {
        self
    }

    fn profiles(&self) -> &dyn UserProfileRepository {
        self
    }

    fn photos(&self) -> &dyn UserProfilePhotoRepository {
        self
    }

    fn articles(&self) -> &dyn ArticleRepository {
        self
    }

    fn likes(&self) -> &dyn LikeRepository {
        self
    }

    fn comments(&self) -> &dyn CommentRepository {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), RepoError> {
        let InMemoryTransaction {
            mut committed,
            working,
        } = *self;
        *committed = working.into_inner().unwrap_or_else(PoisonError::into_inner);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepoError> {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryTransaction {
    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let mut t = self.tables();
        if t.username_taken(&new_user.username, None) {
            return Err(RepoError::Constraint("users_username_key".into()));
        }

        let now = Utc::now();
        let user = User {
            id: next(&mut t.seq.users),
            username: new_user.username,
            password_hash: new_user.password_hash,
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.tables().users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.tables().users.values().cloned().collect())
    }

    async fn update(&self, user: &User) -> Result<User, RepoError> {
        let mut t = self.tables();
        if t.username_taken(&user.username, Some(user.id)) {
            return Err(RepoError::Constraint("users_username_key".into()));
        }

        let stored = t.users.get_mut(&user.id).ok_or(RepoError::NotFound)?;
        stored.username = user.username.clone();
        stored.password_hash = user.password_hash.clone();
        stored.role = user.role;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut t = self.tables();
        if !t.users.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        t.remove_user(id);
        Ok(())
    }
}

#[async_trait]
impl UserProfileRepository for InMemoryTransaction {
    async fn create(&self, profile: NewUserProfile) -> Result<UserProfile, RepoError> {
        let mut t = self.tables();
        t.require_user(profile.user_id)?;
        if t.profiles.contains_key(&profile.user_id) {
            return Err(RepoError::Constraint("user_profiles_pkey".into()));
        }

        let now = Utc::now();
        let profile = UserProfile {
            user_id: profile.user_id,
            full_name: profile.full_name,
            gender: None,
            birth_date: None,
            phone_number: None,
            address: None,
            created_at: now,
            updated_at: now,
        };
        t.profiles.insert(profile.user_id, profile.clone());
        Ok(profile)
    }

    async fn find_by_user_id(&self, user_id: i64) -> Result<Option<UserProfile>, RepoError> {
        Ok(self.tables().profiles.get(&user_id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<UserProfile>, RepoError> {
        Ok(self.tables().profiles.values().cloned().collect())
    }

    async fn update(&self, profile: &UserProfile) -> Result<UserProfile, RepoError> {
        let mut t = self.tables();
        let stored = t
            .profiles
            .get_mut(&profile.user_id)
            .ok_or(RepoError::NotFound)?;
        stored.full_name = profile.full_name.clone();
        stored.gender = profile.gender.clone();
        stored.birth_date = profile.birth_date.clone();
        stored.phone_number = profile.phone_number.clone();
        stored.address = profile.address.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }
}

#[async_trait]
impl UserProfilePhotoRepository for InMemoryTransaction {
    async fn create(&self, user_id: i64, path: &str) -> Result<UserProfilePhoto, RepoError> {
        let mut t = self.tables();
        t.require_user(user_id)?;
        if t.photos.contains_key(&user_id) {
            return Err(RepoError::Constraint("user_profile_photos_pkey".into()));
        }

        let now = Utc::now();
        let photo = UserProfilePhoto {
            user_id,
            path: path.to_string(),
            created_at: now,
            updated_at: now,
        };
        t.photos.insert(user_id, photo.clone());
        Ok(photo)
    }

    async fn find_by_user_id(
        &self,
        user_id: i64,
    ) -> Result<Option<UserProfilePhoto>, RepoError> {
        Ok(self.tables().photos.get(&user_id).cloned())
    }

    async fn update(&self, user_id: i64, path: &str) -> Result<UserProfilePhoto, RepoError> {
        let mut t = self.tables();
        let stored = t.photos.get_mut(&user_id).ok_or(RepoError::NotFound)?;
        stored.path = path.to_string();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }
}

#[async_trait]
impl ArticleRepository for InMemoryTransaction {
    async fn create(&self, article: NewArticle) -> Result<i64, RepoError> {
        let mut t = self.tables();
        t.require_user(article.user_id)?;

        let now = Utc::now();
        let id = next(&mut t.seq.articles);
        t.articles.insert(
            id,
            ArticleRow {
                id,
                user_id: article.user_id,
                title: article.title,
                description: article.description,
                content: article.content,
                is_published: false,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn create_media(&self, media: NewArticleMedia) -> Result<ArticleMedia, RepoError> {
        let mut t = self.tables();
        t.require_article(media.article_id)?;

        let now = Utc::now();
        let media = ArticleMedia {
            id: next(&mut t.seq.media),
            article_id: media.article_id,
            media_type: media.media_type,
            path: media.path,
            created_at: now,
            updated_at: now,
        };
        t.media.insert(media.id, media.clone());
        Ok(media)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Article>, RepoError> {
        let t = self.tables();
        Ok(t.articles.get(&id).map(|row| t.compose(row)))
    }

    async fn find_all(&self, filter: ArticleFilter) -> Result<Vec<Article>, RepoError> {
        let t = self.tables();
        let mut rows: Vec<&ArticleRow> = t
            .articles
            .values()
            .filter(|row| filter.matches(row.user_id, row.is_published))
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows.into_iter().map(|row| t.compose(row)).collect())
    }

    async fn update(&self, changes: &ArticleChanges) -> Result<(), RepoError> {
        let mut t = self.tables();
        let row = t.articles.get_mut(&changes.id).ok_or(RepoError::NotFound)?;
        row.title = changes.title.clone();
        row.description = changes.description.clone();
        row.content = changes.content.clone();
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn set_published(&self, id: i64, published: bool) -> Result<(), RepoError> {
        let mut t = self.tables();
        let row = t.articles.get_mut(&id).ok_or(RepoError::NotFound)?;
        row.is_published = published;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut t = self.tables();
        if !t.articles.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        t.remove_article(id);
        Ok(())
    }
}

#[async_trait]
impl LikeRepository for InMemoryTransaction {
    async fn create(&self, user_id: i64, article_id: i64) -> Result<(), RepoError> {
        let mut t = self.tables();
        t.require_user(user_id)?;
        t.require_article(article_id)?;
        if t
            .likes
            .values()
            .any(|l| l.user_id == user_id && l.article_id == article_id)
        {
            return Err(RepoError::Constraint("likes_user_id_article_id_key".into()));
        }

        let now = Utc::now();
        let id = next(&mut t.seq.likes);
        t.likes.insert(
            id,
            Like {
                id,
                user_id,
                article_id,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn find_by_user_and_article(
        &self,
        user_id: i64,
        article_id: i64,
    ) -> Result<Option<Like>, RepoError> {
        Ok(self
            .tables()
            .likes
            .values()
            .find(|l| l.user_id == user_id && l.article_id == article_id)
            .cloned())
    }

    async fn find_by_article_id(&self, article_id: i64) -> Result<Vec<Like>, RepoError> {
        Ok(self
            .tables()
            .likes
            .values()
            .filter(|l| l.article_id == article_id)
            .cloned()
            .collect())
    }

    async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Like>, RepoError> {
        Ok(self
            .tables()
            .likes
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, user_id: i64, article_id: i64) -> Result<(), RepoError> {
        let mut t = self.tables();
        let before = t.likes.len();
        t.likes
            .retain(|_, l| !(l.user_id == user_id && l.article_id == article_id));
        if t.likes.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryTransaction {
    async fn create(&self, comment: NewComment) -> Result<i64, RepoError> {
        let mut t = self.tables();
        t.require_user(comment.user_id)?;
        t.require_article(comment.article_id)?;

        let now = Utc::now();
        let id = next(&mut t.seq.comments);
        t.comments.insert(
            id,
            Comment {
                id,
                user_id: comment.user_id,
                article_id: comment.article_id,
                body: comment.body,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables().comments.get(&id).cloned())
    }

    async fn find_by_article_id(&self, article_id: i64) -> Result<Vec<Comment>, RepoError> {
        Ok(self
            .tables()
            .comments
            .values()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        self.tables()
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}
