use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's like of an article. At most one per (user, article) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: i64,
    pub user_id: i64,
    pub article_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
