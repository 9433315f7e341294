//! Unified error handling for the backend API.
//!
//! Handlers return [`ApiResult`] and use `?`. Every error renders as
//! `{ "error": true, "message": ... }`. Authentication and authorization
//! failures are 401, unknown items 404, and everything unexpected 500 with a
//! generic message; the underlying cause is logged, never returned.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

pub use shared_types::ErrorResponse;

use crate::auth::{ProviderError, TokenError};
use crate::repository::StoreError;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error occured";

/// Unified error type for API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, invalid, expired or tampered session token
    #[error("Invalid Token: {0}")]
    Unauthenticated(#[from] TokenError),

    /// Valid session, but the caller does not own the resource
    #[error("{0}")]
    PermissionDenied(String),

    #[error("Item not found")]
    NotFound,

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Request body could not be parsed
    #[error("Invalid request: {0}")]
    BadInput(#[from] JsonRejection),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn permission_denied(message: impl Into<String>) -> Self {
        ApiError::PermissionDenied(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) | ApiError::PermissionDenied(_) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::NotFound | ApiError::UnknownProvider(_) => StatusCode::NOT_FOUND,
            ApiError::BadInput(_)
            | ApiError::Store(_)
            | ApiError::Provider(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self);
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: ApiError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn token_errors_are_401_with_detail() {
        let (status, body) = body_of(TokenError::Expired.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, ErrorResponse::new("Invalid Token: jwt expired"));
    }

    #[tokio::test]
    async fn permission_denied_is_401_with_its_message() {
        let (status, body) = body_of(ApiError::permission_denied(
            "You don't have permission to delete this item",
        ))
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.message, "You don't have permission to delete this item");
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let (status, body) = body_of(ApiError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.message, "Item not found");
    }

    #[tokio::test]
    async fn unexpected_errors_hide_their_cause() {
        let (status, body) =
            body_of(anyhow::anyhow!("connection refused to db.internal:5432").into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, ErrorResponse::new(INTERNAL_ERROR_MESSAGE));

        let (status, body) =
            body_of(StoreError::Conflict("users_email_key".to_string()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.message.contains("users_email_key"));
    }
}
