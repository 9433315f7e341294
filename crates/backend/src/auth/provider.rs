//! OAuth provider abstraction.
//!
//! Each identity provider is a variant behind [`OAuthProvider`]; the login and
//! callback handlers only talk to this trait.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// The scopes every provider must request.
pub const LOGIN_SCOPES: [&str; 3] = ["openid", "email", "profile"];

/// Profile fields returned by a provider after a successful code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    /// The provider's stable subject identifier
    pub subject: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Missing authorization code")]
    MissingCode,

    #[error("Provider denied authorization: {0}")]
    Denied(String),

    #[error("Token exchange failed with status {status}")]
    TokenExchange { status: u16, body: String },

    #[error("Provider request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Short name used in routes, e.g. `google` for `/api/auth/google`.
    fn name(&self) -> &str;

    /// URL the user agent is redirected to in order to log in.
    fn authorization_url(&self) -> String;

    /// Exchange an authorization code for the user's profile.
    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, ProviderError>;
}

/// Registered providers, looked up by route name.
#[derive(Clone, Default)]
pub struct Providers {
    inner: Arc<HashMap<String, Arc<dyn OAuthProvider>>>,
}

impl Providers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl OAuthProvider + 'static) -> Self {
        let provider: Arc<dyn OAuthProvider> = Arc::new(provider);
        Arc::make_mut(&mut self.inner).insert(provider.name().to_string(), provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn OAuthProvider>> {
        self.inner.get(name).cloned()
    }
}
