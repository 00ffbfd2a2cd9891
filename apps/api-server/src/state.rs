//! Application state - shared across all handlers.

use std::path::PathBuf;
use std::sync::Arc;

use quill_core::ports::{PasswordService, TokenService, TransactionManager};
use quill_core::services::{
    ArticleService, AuthService, CommentService, LikeService, PhotoService, ProfileService,
    UserService,
};
use quill_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService};

#[cfg(feature = "postgres")]
use quill_infra::SeaOrmTransactionManager;

use crate::config::AppConfig;

/// Startup failures that must stop the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("database connection failed: {0}")]
    Database(String),
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub profiles: Arc<ProfileService>,
    pub photos: Arc<PhotoService>,
    pub articles: Arc<ArticleService>,
    pub likes: Arc<LikeService>,
    pub comments: Arc<CommentService>,
    pub tokens: Arc<dyn TokenService>,
    pub upload_dir: PathBuf,
    pub cookie_secure: bool,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// The in-memory store is only used when no database is configured; a
    /// configured database that cannot be reached is an error.
    pub async fn new(config: &AppConfig) -> Result<Self, StartupError> {
        let db = Self::storage(config).await?;
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));

        let state = Self::build(db, tokens, config.upload_dir.clone(), config.cookie_secure);
        tracing::info!("Application state initialized");
        Ok(state)
    }

    /// Wire every service onto one transaction manager.
    pub fn build(
        db: Arc<dyn TransactionManager>,
        tokens: Arc<dyn TokenService>,
        upload_dir: PathBuf,
        cookie_secure: bool,
    ) -> Self {
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        Self {
            auth: Arc::new(AuthService::new(db.clone(), passwords.clone(), tokens.clone())),
            users: Arc::new(UserService::new(db.clone(), passwords)),
            profiles: Arc::new(ProfileService::new(db.clone())),
            photos: Arc::new(PhotoService::new(db.clone())),
            articles: Arc::new(ArticleService::new(db.clone())),
            likes: Arc::new(LikeService::new(db.clone())),
            comments: Arc::new(CommentService::new(db)),
            tokens,
            upload_dir,
            cookie_secure,
        }
    }

    #[cfg(feature = "postgres")]
    async fn storage(config: &AppConfig) -> Result<Arc<dyn TransactionManager>, StartupError> {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Ok(Arc::new(InMemoryStore::new()));
        };

        let conn = quill_infra::database::connect(db_config)
            .await
            .map_err(|e| StartupError::Database(e.to_string()))?;
        Ok(Arc::new(SeaOrmTransactionManager::new(conn)))
    }

    #[cfg(not(feature = "postgres"))]
    async fn storage(_config: &AppConfig) -> Result<Arc<dyn TransactionManager>, StartupError> {
        tracing::info!("Running without postgres feature - using in-memory store");
        Ok(Arc::new(InMemoryStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use quill_infra::JwtConfig;

    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            #[cfg(feature = "postgres")]
            database: None,
            jwt: JwtConfig {
                secret: "state-test-secret".to_string(),
                expiration_hours: 1,
                issuer: "quill-api".to_string(),
            },
            upload_dir: PathBuf::from("./target/test-photos"),
            cookie_secure: false,
        }
    }

    #[actix_rt::test]
    async fn without_database_url_the_memory_store_is_used() {
        assert!(AppState::new(&config()).await.is_ok());
    }

    #[cfg(feature = "postgres")]
    #[actix_rt::test]
    async fn unreachable_database_stops_startup() {
        let mut config = config();
        config.database = Some(quill_infra::DatabaseConfig {
            url: "unsupported://nowhere/quill".to_string(),
            max_connections: 1,
            min_connections: 1,
        });

        let err = AppState::new(&config).await.err();
        assert!(matches!(err, Some(StartupError::Database(_))));
    }
}
