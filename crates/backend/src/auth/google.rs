//! Google OAuth 2.0 / OpenID Connect login.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::provider::{OAuthProvider, ProviderError, ProviderProfile, LOGIN_SCOPES};

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Endpoint URLs, overridable so tests can point at a local server.
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoogleProvider {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    endpoints: GoogleEndpoints,
    http_client: reqwest::Client,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    code: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    grant_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

/// OpenID Connect userinfo response.
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    picture: Option<String>,
}

impl From<GoogleUserInfo> for ProviderProfile {
    fn from(info: GoogleUserInfo) -> Self {
        ProviderProfile {
            subject: info.sub,
            email: info.email,
            display_name: info.name,
            given_name: info.given_name,
            family_name: info.family_name,
            picture: info.picture,
        }
    }
}

impl GoogleProvider {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            endpoints: GoogleEndpoints::default(),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: GoogleEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }
}

#[async_trait]
impl OAuthProvider for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn authorization_url(&self) -> String {
        format!(
            "{}?\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             scope={}",
            self.endpoints.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&LOGIN_SCOPES.join(" ")),
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, ProviderError> {
        let token_response = self
            .http_client
            .post(&self.endpoints.token_url)
            .form(&TokenRequest {
                code,
                client_id: &self.client_id,
                client_secret: &self.client_secret,
                redirect_uri: &self.redirect_uri,
                grant_type: "authorization_code",
            })
            .send()
            .await?;

        if !token_response.status().is_success() {
            let status = token_response.status().as_u16();
            let body = token_response.text().await.unwrap_or_default();
            return Err(ProviderError::TokenExchange { status, body });
        }

        let tokens: GoogleTokenResponse = token_response.json().await?;

        let user_info: GoogleUserInfo = self
            .http_client
            .get(&self.endpoints.userinfo_url)
            .bearer_auth(&tokens.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::debug!(subject = %user_info.sub, "Fetched Google profile");

        Ok(user_info.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_url_carries_client_redirect_and_scopes() {
        let provider = GoogleProvider::new(
            "client-id-1234567890",
            "secret",
            "http://localhost:4000/api/auth/google/callback",
        );

        let url = reqwest::Url::parse(&provider.authorization_url()).unwrap();
        assert_eq!(url.host_str(), Some("accounts.google.com"));

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "client-id-1234567890");
        assert_eq!(
            params["redirect_uri"],
            "http://localhost:4000/api/auth/google/callback"
        );
        assert_eq!(params["response_type"], "code");

        let scopes: Vec<&str> = params["scope"].split(' ').collect();
        for scope in LOGIN_SCOPES {
            assert!(scopes.contains(&scope), "missing scope {scope}");
        }
    }

    #[test]
    fn userinfo_maps_onto_profile() {
        let info: GoogleUserInfo = serde_json::from_value(serde_json::json!({
            "sub": "12345678",
            "name": "John Doe",
            "given_name": "John",
            "family_name": "Doe",
            "picture": "https://lh3.googleusercontent.com/a-/AOh1",
            "email": "john.doe@gmail.com",
            "email_verified": true,
            "locale": "en-GB"
        }))
        .unwrap();

        let profile = ProviderProfile::from(info);
        assert_eq!(profile.subject, "12345678");
        assert_eq!(profile.display_name.as_deref(), Some("John Doe"));
        assert_eq!(profile.given_name.as_deref(), Some("John"));
        assert_eq!(profile.family_name.as_deref(), Some("Doe"));
        assert_eq!(profile.email.as_deref(), Some("john.doe@gmail.com"));
    }
}
