//! Repository traits for the user and todo stores.
//!
//! Handlers only see these traits. The Postgres implementation lives in
//! [`crate::db`], the in-memory one in [`crate::memory`].

use async_trait::async_trait;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::pooled_connection::deadpool::PoolError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewTodo, NewUser, TodoRecord, User};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint (email or provider id) rejected the write
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Database connection error")]
    ConnectionPool(#[source] PoolError),

    #[error("Database error: {0}")]
    Database(#[source] DieselError),
}

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StoreError::Conflict(
                    info.constraint_name()
                        .unwrap_or_else(|| info.message())
                        .to_string(),
                )
            }
            other => StoreError::Database(other),
        }
    }
}

impl From<PoolError> for StoreError {
    fn from(err: PoolError) -> Self {
        StoreError::ConnectionPool(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for users, keyed by provider identity.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_provider_id(&self, provider_id: &str) -> StoreResult<Option<User>>;

    /// Insert a user. Fails with [`StoreError::Conflict`] when the email or
    /// provider id is already taken.
    async fn create(&self, user: NewUser) -> StoreResult<User>;
}

/// Persistence for todos. Ownership is checked by callers, not here.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All todos owned by `user_id`, oldest first.
    async fn list_by_owner(&self, user_id: Uuid) -> StoreResult<Vec<TodoRecord>>;

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<TodoRecord>>;

    async fn create(&self, todo: NewTodo) -> StoreResult<TodoRecord>;

    /// Returns `None` when the todo no longer exists.
    async fn set_done(&self, id: Uuid, done: bool) -> StoreResult<Option<TodoRecord>>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both stores must be usable behind `Arc<dyn ...>` in the app state
    fn _assert_object_safe(_users: &dyn UserStore, _todos: &dyn TodoStore) {}

    #[test]
    fn unique_violation_maps_to_conflict() {
        #[derive(Debug)]
        struct Info;

        impl diesel::result::DatabaseErrorInformation for Info {
            fn message(&self) -> &str {
                "duplicate key value violates unique constraint"
            }
            fn details(&self) -> Option<&str> {
                None
            }
            fn hint(&self) -> Option<&str> {
                None
            }
            fn table_name(&self) -> Option<&str> {
                Some("users")
            }
            fn column_name(&self) -> Option<&str> {
                None
            }
            fn constraint_name(&self) -> Option<&str> {
                Some("users_provider_id_key")
            }
            fn statement_position(&self) -> Option<i32> {
                None
            }
        }

        let err = StoreError::from(DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(Info),
        ));

        match err {
            StoreError::Conflict(constraint) => assert_eq!(constraint, "users_provider_id_key"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn other_database_errors_stay_database_errors() {
        let err = StoreError::from(DieselError::NotFound);
        assert!(matches!(err, StoreError::Database(DieselError::NotFound)));
    }
}
