//! Authentication module for JWT cookie auth with OAuth login.
//!
//! This module provides:
//! - JWT token creation and validation, optionally sealed with AES-GCM
//! - The `OAuthProvider` abstraction and its Google implementation
//! - `require_auth` middleware for protecting routes

pub mod cipher;
pub mod google;
mod handlers;
pub mod jwt;
mod middleware;
pub mod provider;
pub mod types;

pub use cipher::CookieCipher;
pub use google::{GoogleEndpoints, GoogleProvider};
pub use handlers::{auth_callback, auth_login, auth_logout, auth_me};
pub use middleware::{build_auth_cookie, clear_auth_cookie, require_auth};
pub use provider::{OAuthProvider, ProviderError, ProviderProfile, Providers};
pub use types::{AuthConfig, Claims, TokenError, TOKEN_DURATION_DAYS};
