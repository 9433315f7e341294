use axum::{extract::FromRequest, http::StatusCode};

use crate::error::ApiError;

pub mod todos;

/// JSON body extractor whose rejection goes through [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
