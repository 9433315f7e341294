use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared_types::{CreateTodoRequest, Todo, UpdateTodoRequest};
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::{ApiError, ApiResult};
use crate::models::{NewTodo, TodoRecord};
use crate::AppState;

use super::ApiJson;

/// Load a todo and check that `owner` may modify it.
async fn load_owned(
    state: &AppState,
    id: &str,
    owner: Uuid,
    denied_message: &str,
) -> ApiResult<TodoRecord> {
    // Ids that are not UUIDs cannot exist
    let id = Uuid::parse_str(id).map_err(|_| ApiError::NotFound)?;

    let todo = state.todos.get_by_id(id).await?.ok_or(ApiError::NotFound)?;

    if !todo.is_owned_by(owner) {
        tracing::warn!("User {} denied access to todo {}", owner, todo.id);
        return Err(ApiError::permission_denied(denied_message));
    }

    Ok(todo)
}

/// `GET /api/todos`: the caller's todos.
pub async fn list_todos(State(state): State<AppState>, claims: Claims) -> ApiResult<Json<Vec<Todo>>> {
    let owner = claims.user_id()?;
    let todos = state.todos.list_by_owner(owner).await?;

    Ok(Json(todos.into_iter().map(Into::into).collect()))
}

/// `POST /api/todos`: create a todo owned by the caller.
pub async fn create_todo(
    State(state): State<AppState>,
    claims: Claims,
    ApiJson(payload): ApiJson<CreateTodoRequest>,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    let owner = claims.user_id()?;
    let todo = state
        .todos
        .create(NewTodo::for_owner(owner, payload.text))
        .await?;

    Ok((StatusCode::CREATED, Json(todo.into())))
}

/// `PUT /api/todos/:id`: set `done` on one of the caller's todos.
pub async fn update_todo(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateTodoRequest>,
) -> ApiResult<Json<Todo>> {
    let owner = claims.user_id()?;
    let todo = load_owned(
        &state,
        &id,
        owner,
        "You don't have permission to update this item",
    )
    .await?;

    let updated = state
        .todos
        .set_done(todo.id, payload.done)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(updated.into()))
}

/// `DELETE /api/todos/:id`: delete one of the caller's todos.
pub async fn delete_todo(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let owner = claims.user_id()?;
    let todo = load_owned(
        &state,
        &id,
        owner,
        "You don't have permission to delete this item",
    )
    .await?;

    state.todos.delete(todo.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
