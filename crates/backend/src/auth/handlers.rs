//! Authentication HTTP handlers.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::services::users;
use crate::AppState;

use super::{
    build_auth_cookie, clear_auth_cookie, jwt,
    provider::{OAuthProvider, ProviderError},
    types::{AuthUserResponse, Claims},
};

const HOME: &str = "/";

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

fn lookup_provider(state: &AppState, name: &str) -> ApiResult<std::sync::Arc<dyn OAuthProvider>> {
    state
        .providers
        .get(name)
        .ok_or_else(|| ApiError::UnknownProvider(name.to_string()))
}

/// Start the OAuth login flow by redirecting to the provider.
pub async fn auth_login(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> ApiResult<Response> {
    let provider = lookup_provider(&state, &provider)?;
    Ok(found(&provider.authorization_url()))
}

#[derive(Debug, Deserialize)]
pub struct AuthCallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// Handle the provider's OAuth callback.
///
/// Exchanges the code for a profile, loads or creates the user and sets the
/// session cookie. Any failure redirects home without a cookie.
pub async fn auth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<AuthCallbackParams>,
) -> ApiResult<Response> {
    let provider = lookup_provider(&state, &provider)?;

    match handle_callback_inner(&state, provider.as_ref(), params).await {
        Ok(response) => Ok(response),
        Err(e) => {
            tracing::warn!("Auth callback for {} failed: {}", provider.name(), e);
            Ok(found(HOME))
        }
    }
}

async fn handle_callback_inner(
    state: &AppState,
    provider: &dyn OAuthProvider,
    params: AuthCallbackParams,
) -> Result<Response, ApiError> {
    if let Some(error) = params.error {
        return Err(ProviderError::Denied(error).into());
    }
    let code = params.code.ok_or(ProviderError::MissingCode)?;

    let profile = provider.exchange_code(&code).await?;
    let user = users::find_or_create(state.users.as_ref(), provider.name(), profile).await?;

    let token = jwt::create_token(&state.auth_config, &user)?;
    let cookie = build_auth_cookie(&state.auth_config, &token);

    tracing::info!("Successful login for: {}", user.provider_id);

    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, HOME), (header::SET_COOKIE, cookie.as_str())],
    )
        .into_response())
}

/// Get current authenticated user info.
pub async fn auth_me(claims: Claims) -> Json<AuthUserResponse> {
    Json(AuthUserResponse {
        name: claims.name,
        email: claims.email,
        avatar: claims.avatar,
    })
}

/// Logout - clear auth cookie.
pub async fn auth_logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = clear_auth_cookie(&state.auth_config);

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "message": "Logged out" })),
    )
}
