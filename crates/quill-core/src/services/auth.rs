//! Login and registration.

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::domain::{DEFAULT_PROFILE_PHOTO, NewUser, NewUserProfile, RegisteredUser};
use crate::error::{DomainError, DomainResult, RepoError};
use crate::ports::{
    PasswordService, TokenClaims, TokenService, Transaction, TransactionManager,
    commit_or_rollback,
};
use crate::validation::validate;

#[derive(Debug, Clone, Validate)]
pub struct LoginInput {
    #[validate(length(min = 6, max = 16, message = "username must be 6 to 16 characters"))]
    pub username: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

/// Registration never carries a role: accounts are created as `user`.
#[derive(Debug, Clone, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 6, max = 16, message = "username must be 6 to 16 characters"))]
    pub username: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 255, message = "full name is required"))]
    pub full_name: String,
}

/// A freshly issued session: the signed token and the claims it carries.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub claims: TokenClaims,
}

pub struct AuthService {
    db: Arc<dyn TransactionManager>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
}

impl AuthService {
    pub fn new(
        db: Arc<dyn TransactionManager>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            db,
            passwords,
            tokens,
        }
    }

    /// Verify credentials and issue a session token.
    ///
    /// An unknown username and a wrong password fail identically.
    pub async fn login(&self, input: LoginInput) -> DomainResult<Session> {
        validate(&input)?;

        let tx = self.db.begin().await?;
        let result = tx.users().find_by_username(&input.username).await;
        let user = commit_or_rollback(tx, result.map_err(DomainError::from)).await?;

        let Some(user) = user else {
            tracing::info!("Login rejected: unknown username");
            return Err(invalid_login());
        };

        if !self.passwords.verify(&input.password, &user.password_hash)? {
            tracing::info!(user_id = user.id, "Login rejected: password mismatch");
            return Err(invalid_login());
        }

        let claims = TokenClaims::new(
            user.id,
            user.username,
            user.role,
            Utc::now() + self.tokens.expiration(),
        );
        let token = self.tokens.issue_token(&claims)?;

        tracing::info!(user_id = claims.user_id, role = %claims.role, "Session issued");
        Ok(Session { token, claims })
    }

    /// Create a user with an empty profile and the default photo.
    pub async fn register(&self, input: RegisterInput) -> DomainResult<RegisteredUser> {
        validate(&input)?;

        let password_hash = self.passwords.hash(&input.password)?;

        let tx = self.db.begin().await?;
        let result = Self::register_in(tx.as_ref(), input, password_hash).await;
        let registered = commit_or_rollback(tx, result).await?;

        tracing::info!(user_id = registered.user.id, "User registered");
        Ok(registered)
    }

    async fn register_in(
        tx: &dyn Transaction,
        input: RegisterInput,
        password_hash: String,
    ) -> DomainResult<RegisteredUser> {
        let user = tx
            .users()
            .create(NewUser::registered(input.username, password_hash))
            .await
            .map_err(username_conflict)?;

        let profile = tx
            .profiles()
            .create(NewUserProfile {
                user_id: user.id,
                full_name: input.full_name,
            })
            .await?;

        let photo = tx.photos().create(user.id, DEFAULT_PROFILE_PHOTO).await?;

        Ok(RegisteredUser {
            user,
            profile,
            photo,
        })
    }
}

fn invalid_login() -> DomainError {
    DomainError::unauthorized("invalid username or password")
}

pub(crate) fn username_conflict(err: RepoError) -> DomainError {
    match err {
        RepoError::Constraint(_) => DomainError::Conflict("username is already taken".into()),
        other => other.into(),
    }
}
