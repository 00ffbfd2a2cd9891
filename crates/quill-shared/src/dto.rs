//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to register a new account. A `role` field, if sent, is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Claims of the current session. The token itself only travels in the cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user_id: i64,
    pub username: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin edit of an account. The password is kept when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user_id: i64,
    pub full_name: String,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoResponse {
    pub user_id: i64,
    pub path: String,
    pub updated_at: DateTime<Utc>,
}

/// Everything created by a successful registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredResponse {
    pub user: UserResponse,
    pub profile: ProfileResponse,
    pub photo: PhotoResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRequest {
    #[serde(rename = "type")]
    pub media_type: String,
    pub path: String,
}

/// Request to create an article. New articles are always drafts, so any
/// `is_published` sent by the client is dropped during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub media: Vec<MediaRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateArticleRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub content: String,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaResponse {
    pub id: i64,
    #[serde(rename = "type")]
    pub media_type: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleResponse {
    pub id: i64,
    pub user_id: i64,
    pub author: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub is_published: bool,
    pub media: Vec<MediaResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeResponse {
    pub id: i64,
    pub user_id: i64,
    pub article_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: i64,
    pub user_id: i64,
    pub article_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_article_drops_client_publish_flag() {
        let body = r#"{"title":"T","content":"C","is_published":true}"#;
        let request: CreateArticleRequest = serde_json::from_str(body).unwrap();

        let echoed = serde_json::to_value(&request).unwrap();
        assert!(echoed.get("is_published").is_none());
        assert!(request.media.is_empty());
    }

    #[test]
    fn media_type_uses_short_key() {
        let body = r#"{"type":"image/png","path":"a.png"}"#;
        let media: MediaRequest = serde_json::from_str(body).unwrap();
        assert_eq!(media.media_type, "image/png");
    }
}
