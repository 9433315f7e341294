//! Auth-related types and configuration.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::User;

use super::cipher::CookieCipher;

pub use shared_types::AuthUserResponse;

/// Default session lifetime.
pub const TOKEN_DURATION_DAYS: i64 = 14;

/// Default name of the session cookie.
pub const DEFAULT_COOKIE_NAME: &str = "_t";

/// JWT claims carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (stored user id)
    pub sub: String,
    pub name: String,
    pub email: Option<String>,
    #[serde(rename = "providerId")]
    pub provider_id: String,
    pub avatar: Option<String>,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    pub fn for_user(user: &User, issued_at: DateTime<Utc>, duration_days: i64) -> Self {
        let exp = issued_at + Duration::days(duration_days);

        Self {
            sub: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            provider_id: user.provider_id.clone(),
            avatar: user.profile_picture.clone(),
            iat: issued_at.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// The owner id used for todo ownership checks.
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::InvalidSubject)
    }
}

/// Claims are inserted into request extensions by `require_auth`.
#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or(ApiError::Unauthenticated(TokenError::Missing))
    }
}

/// Why a session token was rejected. Messages never include the token itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("No authorization token was found")]
    Missing,

    #[error("jwt expired")]
    Expired,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("jwt malformed")]
    Malformed,

    #[error("unable to decrypt token")]
    Undecryptable,

    #[error("invalid subject")]
    InvalidSubject,
}

/// Token and cookie settings, passed explicitly to the router.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub cookie_cipher: Option<CookieCipher>,
    pub cookie_name: String,
    pub token_duration_days: i64,
    pub secure_cookies: bool,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            cookie_cipher: None,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            token_duration_days: TOKEN_DURATION_DAYS,
            secure_cookies: false,
        }
    }

    pub fn with_cookie_cipher(mut self, cipher: CookieCipher) -> Self {
        self.cookie_cipher = Some(cipher);
        self
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("cookie_encrypted", &self.cookie_cipher.is_some())
            .field("cookie_name", &self.cookie_name)
            .field("token_duration_days", &self.token_duration_days)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}
