//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

#[cfg(feature = "postgres")]
use quill_infra::DatabaseConfig;
use quill_infra::JwtConfig;

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    /// Directory profile photos are written to.
    pub upload_dir: PathBuf,
    /// Mark the session cookie `Secure` (HTTPS deployments).
    pub cookie_secure: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let environment = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());

        #[cfg(feature = "postgres")]
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", 20),
            min_connections: parse_var("DB_MIN_CONNECTIONS", 2),
        });

        let config = Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080),
            environment,
            #[cfg(feature = "postgres")]
            database,
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
                expiration_hours: parse_var("JWT_EXPIRATION_HOURS", 24),
                issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "quill-api".to_string()),
            },
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./public/profile_photos")),
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        };

        config.warn_on_default_secret();
        config
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "production" | "prod")
    }

    fn warn_on_default_secret(&self) {
        if self.jwt.secret != DEFAULT_JWT_SECRET {
            return;
        }
        if self.is_production() {
            tracing::error!(
                "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
            );
        } else {
            tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
