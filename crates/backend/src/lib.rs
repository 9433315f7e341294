//! Authenticated todo API: OAuth login, JWT session cookies and per-user todos.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;

use crate::auth::{AuthConfig, Providers};
use crate::repository::{TodoStore, UserStore};

/// Shared, immutable application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_config: Arc<AuthConfig>,
    pub users: Arc<dyn UserStore>,
    pub todos: Arc<dyn TodoStore>,
    pub providers: Providers,
}

impl AppState {
    pub fn new(
        auth_config: AuthConfig,
        users: Arc<dyn UserStore>,
        todos: Arc<dyn TodoStore>,
        providers: Providers,
    ) -> Self {
        Self {
            auth_config: Arc::new(auth_config),
            users,
            todos,
            providers,
        }
    }
}

/// Build the full application router.
pub fn create_app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
