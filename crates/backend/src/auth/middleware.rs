//! Authentication middleware layer for protecting routes.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use cookie::{time::Duration, Cookie, SameSite};

use crate::error::ApiError;
use crate::AppState;

use super::jwt;
use super::types::{AuthConfig, TokenError};

/// Middleware that requires a valid session cookie.
///
/// Used with `axum::middleware::from_fn_with_state`. On success the decoded
/// [`Claims`](super::types::Claims) are available to handlers as an extractor.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let config = &state.auth_config;

    let token = extract_token_from_cookie(request.headers(), &config.cookie_name)
        .ok_or(TokenError::Missing)?;

    let claims = jwt::verify(config, &token).map_err(|err| {
        tracing::debug!("Rejected session token: {}", err);
        err
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn extract_token_from_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    for cookie_header in headers.get_all(header::COOKIE) {
        let Ok(cookie_header) = cookie_header.to_str() else {
            continue;
        };

        for cookie_str in cookie_header.split(';') {
            if let Ok(cookie) = Cookie::parse(cookie_str.trim()) {
                if cookie.name() == cookie_name && !cookie.value().is_empty() {
                    return Some(cookie.value().to_string());
                }
            }
        }
    }

    None
}

/// Build the `Set-Cookie` value carrying a session token.
pub fn build_auth_cookie(config: &AuthConfig, token: &str) -> String {
    Cookie::build((config.cookie_name.clone(), token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .max_age(Duration::days(config.token_duration_days))
        .build()
        .to_string()
}

/// Build the `Set-Cookie` value that removes the session cookie.
pub fn clear_auth_cookie(config: &AuthConfig) -> String {
    Cookie::build((config.cookie_name.clone(), String::new()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .max_age(Duration::ZERO)
        .build()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; _t=abc.def.ghi; other=1"),
        );

        assert_eq!(
            extract_token_from_cookie(&headers, "_t").as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(extract_token_from_cookie(&headers, "missing"), None);
    }

    #[test]
    fn searches_every_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(header::COOKIE, HeaderValue::from_static("_t=token"));

        assert_eq!(
            extract_token_from_cookie(&headers, "_t").as_deref(),
            Some("token")
        );
    }

    #[test]
    fn empty_cookie_counts_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("_t="));
        assert_eq!(extract_token_from_cookie(&headers, "_t"), None);
    }

    #[test]
    fn auth_cookie_is_http_only_and_lives_fourteen_days() {
        let config = AuthConfig::new("secret");
        let cookie = build_auth_cookie(&config, "abc");
        let parsed = Cookie::parse(cookie.as_str()).unwrap();

        assert_eq!(parsed.name(), "_t");
        assert_eq!(parsed.value(), "abc");
        assert_eq!(parsed.http_only(), Some(true));
        assert_eq!(parsed.path(), Some("/"));
        assert_eq!(parsed.max_age(), Some(Duration::days(14)));
        assert_ne!(parsed.secure(), Some(true));
    }

    #[test]
    fn secure_flag_follows_config() {
        let mut config = AuthConfig::new("secret");
        config.secure_cookies = true;

        let parsed = Cookie::parse(build_auth_cookie(&config, "abc")).unwrap();
        assert_eq!(parsed.secure(), Some(true));
    }

    #[test]
    fn clearing_cookie_expires_it_immediately() {
        let config = AuthConfig::new("secret");
        let parsed = Cookie::parse(clear_auth_cookie(&config)).unwrap();

        assert_eq!(parsed.value(), "");
        assert_eq!(parsed.max_age(), Some(Duration::ZERO));
    }
}
