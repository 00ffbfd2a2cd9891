//! Admin account management.

use std::sync::Arc;

use validator::Validate;

use super::auth::username_conflict;
use crate::domain::{Role, User};
use crate::error::{DomainError, DomainResult};
use crate::policy::Actor;
use crate::ports::{PasswordService, Transaction, TransactionManager, commit_or_rollback};
use crate::validation::validate;

#[derive(Debug, Clone, Validate)]
pub struct UpdateUserInput {
    #[validate(length(min = 6, max = 16, message = "username must be 6 to 16 characters"))]
    pub username: String,
    /// Left unchanged when absent.
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: Option<String>,
    pub role: Role,
}

pub struct UserService {
    db: Arc<dyn TransactionManager>,
    passwords: Arc<dyn PasswordService>,
}

impl UserService {
    pub fn new(db: Arc<dyn TransactionManager>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { db, passwords }
    }

    pub async fn find_all(&self, actor: &Actor) -> DomainResult<Vec<User>> {
        actor.require_role(Role::Admin)?;

        let tx = self.db.begin().await?;
        let result = tx.users().find_all().await.map_err(Into::into);
        commit_or_rollback(tx, result).await
    }

    pub async fn find_by_id(&self, actor: &Actor, id: i64) -> DomainResult<User> {
        actor.require_role(Role::Admin)?;

        let tx = self.db.begin().await?;
        let result = Self::load(tx.as_ref(), id).await;
        commit_or_rollback(tx, result).await
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: i64,
        input: UpdateUserInput,
    ) -> DomainResult<User> {
        actor.require_role(Role::Admin)?;
        validate(&input)?;

        let password_hash = match &input.password {
            Some(password) => Some(self.passwords.hash(password)?),
            None => None,
        };

        let tx = self.db.begin().await?;
        let result = Self::update_in(tx.as_ref(), id, input, password_hash).await;
        let user = commit_or_rollback(tx, result).await?;

        tracing::info!(user_id = id, role = %user.role, "User updated");
        Ok(user)
    }

    async fn update_in(
        tx: &dyn Transaction,
        id: i64,
        input: UpdateUserInput,
        password_hash: Option<String>,
    ) -> DomainResult<User> {
        let mut user = Self::load(tx, id).await?;
        user.username = input.username;
        user.role = input.role;
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }

        tx.users().update(&user).await.map_err(username_conflict)
    }

    pub async fn delete(&self, actor: &Actor, id: i64) -> DomainResult<()> {
        actor.require_role(Role::Admin)?;

        let tx = self.db.begin().await?;
        let result = Self::delete_in(tx.as_ref(), id).await;
        commit_or_rollback(tx, result).await?;

        tracing::info!(user_id = id, admin_id = actor.user_id, "User deleted");
        Ok(())
    }

    async fn delete_in(tx: &dyn Transaction, id: i64) -> DomainResult<()> {
        Self::load(tx, id).await?;
        tx.users().delete(id).await?;
        Ok(())
    }

    async fn load(tx: &dyn Transaction, id: i64) -> DomainResult<User> {
        tx.users()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound("user"))
    }
}
