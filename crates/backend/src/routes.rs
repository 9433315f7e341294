use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use crate::auth;
use crate::handlers::todos;
use crate::AppState;

/// Routes mounted under `/api`.
///
/// The OAuth entry points are public; everything else sits behind
/// `require_auth`.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/auth/:provider", get(auth::auth_login))
        .route("/auth/:provider/callback", get(auth::auth_callback));

    let protected = Router::new()
        // Session routes
        .route("/auth/me", get(auth::auth_me))
        .route("/auth/logout", get(auth::auth_logout))
        // Todo routes
        .route("/todos", get(todos::list_todos).post(todos::create_todo))
        .route(
            "/todos/:id",
            put(todos::update_todo).delete(todos::delete_todo),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::require_auth));

    public.merge(protected)
}
