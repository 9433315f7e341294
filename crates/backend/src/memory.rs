//! In-memory store used for local development (`--memory`) and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{NewTodo, NewUser, TodoRecord, User};
use crate::repository::{StoreError, StoreResult, TodoStore, UserStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    // Insertion order doubles as creation order
    todos: RwLock<Vec<TodoRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_provider_id(&self, provider_id: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.provider_id == provider_id)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.provider_id == user.provider_id) {
            return Err(StoreError::Conflict("users_provider_id_key".to_string()));
        }
        if let Some(email) = user.email.as_deref() {
            if users.values().any(|u| u.email.as_deref() == Some(email)) {
                return Err(StoreError::Conflict("users_email_key".to_string()));
            }
        }

        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            firstname: user.firstname,
            lastname: user.lastname,
            provider: user.provider,
            provider_id: user.provider_id,
            profile_picture: user.profile_picture,
            created_at: Utc::now(),
        };
        users.insert(created.id, created.clone());

        Ok(created)
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list_by_owner(&self, user_id: Uuid) -> StoreResult<Vec<TodoRecord>> {
        let todos = self.todos.read().await;
        Ok(todos
            .iter()
            .filter(|t| t.is_owned_by(user_id))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<TodoRecord>> {
        let todos = self.todos.read().await;
        Ok(todos.iter().find(|t| t.id == id).cloned())
    }

    async fn create(&self, todo: NewTodo) -> StoreResult<TodoRecord> {
        let record = TodoRecord {
            id: Uuid::new_v4(),
            text: todo.text,
            done: todo.done,
            created_at: Utc::now(),
            user_id: todo.user_id,
        };
        self.todos.write().await.push(record.clone());
        Ok(record)
    }

    async fn set_done(&self, id: Uuid, done: bool) -> StoreResult<Option<TodoRecord>> {
        let mut todos = self.todos.write().await;
        Ok(todos.iter_mut().find(|t| t.id == id).map(|todo| {
            todo.done = done;
            todo.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut todos = self.todos.write().await;
        let before = todos.len();
        todos.retain(|t| t.id != id);
        Ok(todos.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_ok, block_on};

    fn google_user(subject: &str, email: Option<&str>) -> NewUser {
        NewUser {
            email: email.map(str::to_string),
            name: "John Doe".to_string(),
            firstname: Some("John".to_string()),
            lastname: Some("Doe".to_string()),
            provider: "google".to_string(),
            provider_id: format!("google-{}", subject),
            profile_picture: None,
        }
    }

    #[test]
    fn users_are_unique_by_provider_id() {
        let store = MemoryStore::new();
        block_on(async {
            assert_ok!(UserStore::create(&store, google_user("1", None)).await);

            let err = UserStore::create(&store, google_user("1", None))
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::Conflict(ref c) if c == "users_provider_id_key"));
        });
    }

    #[test]
    fn users_are_unique_by_email() {
        let store = MemoryStore::new();
        block_on(async {
            assert_ok!(UserStore::create(&store, google_user("1", Some("a@example.com"))).await);

            let err = UserStore::create(&store, google_user("2", Some("a@example.com")))
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::Conflict(ref c) if c == "users_email_key"));

            // Users without an email never collide on it
            assert_ok!(UserStore::create(&store, google_user("3", None)).await);
            assert_ok!(UserStore::create(&store, google_user("4", None)).await);
        });
    }

    #[test]
    fn find_by_provider_id_returns_created_user() {
        let store = MemoryStore::new();
        block_on(async {
            let created = UserStore::create(&store, google_user("42", None))
                .await
                .unwrap();
            let found = store.find_by_provider_id("google-42").await.unwrap();
            assert_eq!(found, Some(created));
            assert_eq!(store.find_by_provider_id("google-7").await.unwrap(), None);
        });
    }

    #[tokio::test]
    async fn todos_are_listed_per_owner() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        TodoStore::create(&store, NewTodo::for_owner(alice, "first"))
            .await
            .unwrap();
        TodoStore::create(&store, NewTodo::for_owner(bob, "other"))
            .await
            .unwrap();
        TodoStore::create(&store, NewTodo::for_owner(alice, "second"))
            .await
            .unwrap();

        let texts: Vec<String> = store
            .list_by_owner(alice)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn set_done_and_delete_missing_todo() {
        let store = MemoryStore::new();
        let todo = TodoStore::create(&store, NewTodo::for_owner(Uuid::new_v4(), "x"))
            .await
            .unwrap();
        assert!(!todo.done);

        let updated = store.set_done(todo.id, true).await.unwrap().unwrap();
        assert!(updated.done);
        assert_eq!(updated.text, "x");

        assert!(store.delete(todo.id).await.unwrap());
        assert!(!store.delete(todo.id).await.unwrap());
        assert_eq!(store.set_done(todo.id, false).await.unwrap(), None);
        assert_eq!(store.get_by_id(todo.id).await.unwrap(), None);
    }
}
