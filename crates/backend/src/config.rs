use anyhow::{Context, Result};
use axum::http::{header, Method};
use clap::Parser;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::auth::{AuthConfig, CookieCipher, TOKEN_DURATION_DAYS};

/// Server configuration. Every flag can also be set from the environment
/// (after `.env` is loaded).
#[derive(Clone, Parser)]
#[command(name = "todo-backend")]
#[command(about = "Authenticated todo API server")]
pub struct AppConfig {
    /// Postgres connection string.
    #[arg(long, env = "DATABASE_URL", required_unless_present = "memory")]
    pub database_url: Option<String>,

    /// Keep users and todos in memory instead of Postgres (development only).
    #[arg(long, env = "USE_MEMORY_STORE")]
    pub memory: bool,

    #[arg(long, env = "PORT", default_value_t = 4000)]
    pub port: u16,

    /// HMAC secret used to sign session tokens.
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// Base64 encoded 32 byte key. When set, session cookies are encrypted.
    #[arg(long, env = "COOKIE_ENCRYPTION_KEY", hide_env_values = true)]
    pub cookie_encryption_key: Option<String>,

    #[arg(long, env = "AUTH_COOKIE_NAME", default_value = "_t")]
    pub cookie_name: String,

    /// Mark the session cookie `Secure`.
    #[arg(long, env = "SECURE_COOKIES")]
    pub secure_cookies: bool,

    #[arg(long, env = "GOOGLE_CLIENT_ID")]
    pub google_client_id: String,

    #[arg(long, env = "GOOGLE_CLIENT_SECRET", hide_env_values = true)]
    pub google_client_secret: String,

    #[arg(
        long,
        env = "GOOGLE_CALLBACK_URL",
        default_value = "http://localhost:4000/api/auth/google/callback"
    )]
    pub google_callback_url: String,

    /// Comma separated list of allowed CORS origins.
    #[arg(long, env = "CORS_ALLOWED_ORIGINS")]
    pub cors_allowed_origins: Option<String>,
}

impl AppConfig {
    pub fn auth_config(&self) -> Result<AuthConfig> {
        let mut config = AuthConfig::new(self.secret_key.clone());
        config.cookie_name = self.cookie_name.clone();
        config.secure_cookies = self.secure_cookies;
        config.token_duration_days = TOKEN_DURATION_DAYS;

        if let Some(key) = &self.cookie_encryption_key {
            let cipher =
                CookieCipher::from_base64_key(key).context("COOKIE_ENCRYPTION_KEY is invalid")?;
            config = config.with_cookie_cipher(cipher);
        }

        Ok(config)
    }

    /// Build CORS layer based on configuration.
    ///
    /// If no origins are configured, defaults to permissive CORS (for
    /// development only).
    pub fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<_> = self
            .cors_allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!(
                "CORS_ALLOWED_ORIGINS not set, using permissive CORS (not recommended for production)"
            );
            return CorsLayer::permissive();
        }

        tracing::info!("CORS configured for origins: {:?}", origins);
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
    }
}
