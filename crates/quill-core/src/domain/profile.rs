use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::User;

/// Photo path every account starts with.
pub const DEFAULT_PROFILE_PHOTO: &str = "default_profile_photo.svg";

/// Personal details owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub full_name: String,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile created alongside a fresh account.
#[derive(Debug, Clone)]
pub struct NewUserProfile {
    pub user_id: i64,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfilePhoto {
    pub user_id: i64,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfilePhoto {
    pub fn is_default(&self) -> bool {
        self.path == DEFAULT_PROFILE_PHOTO
    }
}

/// Everything registration writes for a new account.
#[derive(Debug, Clone)]
pub struct RegisteredUser {
    pub user: User,
    pub profile: UserProfile,
    pub photo: UserProfilePhoto,
}

/// Outcome of swapping a profile photo.
///
/// `previous` holds the asset the caller should delete, never the default photo.
#[derive(Debug, Clone)]
pub struct PhotoReplacement {
    pub photo: UserProfilePhoto,
    pub previous: Option<String>,
}
