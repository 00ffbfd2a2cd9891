use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two states of an article's visibility flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Draft,
    Published,
}

impl Visibility {
    pub fn is_published(self) -> bool {
        matches!(self, Visibility::Published)
    }
}

impl From<bool> for Visibility {
    fn from(published: bool) -> Self {
        if published {
            Visibility::Published
        } else {
            Visibility::Draft
        }
    }
}

/// Article entity, composed with its author's display name and media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub content: String,
    pub author: String,
    pub is_published: bool,
    pub media: Vec<ArticleMedia>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    pub fn visibility(&self) -> Visibility {
        Visibility::from(self.is_published)
    }

    pub fn is_authored_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMedia {
    pub id: i64,
    pub article_id: i64,
    pub media_type: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Article row to insert. There is no publish flag: new articles are drafts.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct NewArticleMedia {
    pub article_id: i64,
    pub media_type: String,
    pub path: String,
}

/// Editable fields of an existing article.
#[derive(Debug, Clone)]
pub struct ArticleChanges {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub content: String,
}

/// Filter for article listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArticleFilter {
    pub visibility: Option<Visibility>,
    pub author_id: Option<i64>,
}

impl ArticleFilter {
    pub fn with_visibility(visibility: Visibility) -> Self {
        Self {
            visibility: Some(visibility),
            author_id: None,
        }
    }

    pub fn by_author(mut self, author_id: i64) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn matches(&self, user_id: i64, is_published: bool) -> bool {
        self.visibility
            .is_none_or(|v| v.is_published() == is_published)
            && self.author_id.is_none_or(|id| id == user_id)
    }
}
