// Database models for Diesel
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// A user created on first OAuth login for a given provider identity.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
    pub name: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub provider: String,
    pub provider_id: String, // "<provider>-<subject>", e.g. "google-1234"
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for new users
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub email: Option<String>,
    pub name: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub provider: String,
    pub provider_id: String,
    pub profile_picture: Option<String>,
}

/// Stored todo, including its owner.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = crate::schema::todos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TodoRecord {
    pub id: Uuid,
    pub text: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
}

impl TodoRecord {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

impl From<TodoRecord> for shared_types::Todo {
    fn from(row: TodoRecord) -> Self {
        shared_types::Todo {
            id: row.id,
            text: row.text,
            done: row.done,
            created_at: row.created_at,
        }
    }
}

/// Insertable struct for new todos
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::todos)]
pub struct NewTodo {
    pub text: String,
    pub done: bool,
    pub user_id: Uuid,
}

impl NewTodo {
    pub fn for_owner(user_id: Uuid, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            done: false,
            user_id,
        }
    }
}
