//! Profile details and profile photos.

use std::sync::Arc;

use validator::Validate;

use crate::domain::{PhotoReplacement, Role, UserProfile, UserProfilePhoto};
use crate::error::{DomainError, DomainResult};
use crate::policy::Actor;
use crate::ports::{Transaction, TransactionManager, commit_or_rollback};
use crate::validation::{ensure_valid, field_messages, is_calendar_date, is_e164};

#[derive(Debug, Clone, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 255, message = "full name is required"))]
    pub full_name: String,
    #[validate(length(max = 32, message = "gender must be at most 32 characters"))]
    pub gender: Option<String>,
    /// `YYYY-MM-DD`.
    pub birth_date: Option<String>,
    /// E.164, e.g. `+6281234567890`.
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

impl UpdateProfileInput {
    fn check(&self) -> DomainResult<()> {
        let mut messages = field_messages(self);
        if self
            .birth_date
            .as_deref()
            .is_some_and(|date| !is_calendar_date(date))
        {
            messages.push("birth date must be a valid YYYY-MM-DD date".into());
        }
        if self
            .phone_number
            .as_deref()
            .is_some_and(|phone| !is_e164(phone))
        {
            messages.push("phone number must be in E.164 format".into());
        }
        ensure_valid(messages)
    }
}

pub struct ProfileService {
    db: Arc<dyn TransactionManager>,
}

impl ProfileService {
    pub fn new(db: Arc<dyn TransactionManager>) -> Self {
        Self { db }
    }

    pub async fn find_by_user_id(&self, user_id: i64) -> DomainResult<UserProfile> {
        let tx = self.db.begin().await?;
        let result = Self::load(tx.as_ref(), user_id).await;
        commit_or_rollback(tx, result).await
    }

    pub async fn find_all(&self, actor: &Actor) -> DomainResult<Vec<UserProfile>> {
        actor.require_role(Role::Admin)?;

        let tx = self.db.begin().await?;
        let result = tx.profiles().find_all().await.map_err(Into::into);
        commit_or_rollback(tx, result).await
    }

    /// Overwrite the actor's own profile. Empty optional fields are cleared.
    pub async fn update(&self, actor: &Actor, input: UpdateProfileInput) -> DomainResult<UserProfile> {
        input.check()?;

        let tx = self.db.begin().await?;
        let result = Self::update_in(tx.as_ref(), actor.user_id, input).await;
        let profile = commit_or_rollback(tx, result).await?;

        tracing::info!(user_id = actor.user_id, "Profile updated");
        Ok(profile)
    }

    async fn update_in(
        tx: &dyn Transaction,
        user_id: i64,
        input: UpdateProfileInput,
    ) -> DomainResult<UserProfile> {
        let mut profile = Self::load(tx, user_id).await?;
        profile.full_name = input.full_name;
        profile.gender = non_empty(input.gender);
        profile.birth_date = non_empty(input.birth_date);
        profile.phone_number = non_empty(input.phone_number);
        profile.address = non_empty(input.address);

        tx.profiles().update(&profile).await.map_err(Into::into)
    }

    async fn load(tx: &dyn Transaction, user_id: i64) -> DomainResult<UserProfile> {
        tx.profiles()
            .find_by_user_id(user_id)
            .await?
            .ok_or(DomainError::NotFound("profile"))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub struct PhotoService {
    db: Arc<dyn TransactionManager>,
}

impl PhotoService {
    pub fn new(db: Arc<dyn TransactionManager>) -> Self {
        Self { db }
    }

    pub async fn find_by_user_id(&self, user_id: i64) -> DomainResult<UserProfilePhoto> {
        let tx = self.db.begin().await?;
        let result = Self::load(tx.as_ref(), user_id).await;
        commit_or_rollback(tx, result).await
    }

    /// Point the actor's photo at a freshly stored asset.
    ///
    /// The caller owns the files: it removes `previous` once this succeeds.
    pub async fn replace(&self, actor: &Actor, path: &str) -> DomainResult<PhotoReplacement> {
        if path.trim().is_empty() {
            return Err(DomainError::InvalidParameter("photo path is empty".into()));
        }

        let tx = self.db.begin().await?;
        let result = Self::replace_in(tx.as_ref(), actor.user_id, path).await;
        let replacement = commit_or_rollback(tx, result).await?;

        tracing::info!(user_id = actor.user_id, path, "Profile photo replaced");
        Ok(replacement)
    }

    async fn replace_in(
        tx: &dyn Transaction,
        user_id: i64,
        path: &str,
    ) -> DomainResult<PhotoReplacement> {
        let current = Self::load(tx, user_id).await?;
        let photo = tx.photos().update(user_id, path).await?;

        let previous = (!current.is_default() && current.path != photo.path).then_some(current.path);
        Ok(PhotoReplacement { photo, previous })
    }

    async fn load(tx: &dyn Transaction, user_id: i64) -> DomainResult<UserProfilePhoto> {
        tx.photos()
            .find_by_user_id(user_id)
            .await?
            .ok_or(DomainError::NotFound("profile photo"))
    }
}
