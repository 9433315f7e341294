use anyhow::Context;
use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager, ManagerConfig},
    AsyncPgConnection, RunQueryDsl,
};
use uuid::Uuid;

use crate::models::{NewTodo, NewUser, TodoRecord, User};
use crate::repository::{StoreResult, TodoStore, UserStore};

pub type DbPool = Pool<AsyncPgConnection>;

async fn establish_tls_connection(config: String) -> diesel::ConnectionResult<AsyncPgConnection> {
    // Set up rustls TLS configuration
    let root_store =
        rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();
    let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);

    let (client, connection) = tokio_postgres::connect(&config, tls)
        .await
        .map_err(|e| diesel::ConnectionError::BadConnection(e.to_string()))?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("Connection error: {}", e);
        }
    });

    AsyncPgConnection::try_from(client).await
}

pub fn establish_connection_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let mut manager_config = ManagerConfig::default();
    manager_config.custom_setup =
        Box::new(|url| Box::pin(establish_tls_connection(url.to_string())));

    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_config(
        database_url,
        manager_config,
    );
    let pool = Pool::builder(config)
        .max_size(10)
        .build()
        .context("Failed to create database pool")?;

    Ok(pool)
}

// User database operations
pub mod users {
    use super::*;

    pub async fn find_by_provider_id(
        conn: &mut AsyncPgConnection,
        provider_id_val: &str,
    ) -> QueryResult<Option<User>> {
        use crate::schema::users::dsl::*;

        users
            .filter(provider_id.eq(provider_id_val))
            .select(User::as_select())
            .first(conn)
            .await
            .optional()
    }

    pub async fn create(conn: &mut AsyncPgConnection, new_user: &NewUser) -> QueryResult<User> {
        use crate::schema::users::dsl::*;

        diesel::insert_into(users)
            .values(new_user)
            .returning(User::as_returning())
            .get_result(conn)
            .await
    }
}

// Todo database operations
pub mod todos {
    use super::*;

    pub async fn list_by_owner(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
    ) -> QueryResult<Vec<TodoRecord>> {
        use crate::schema::todos::dsl::*;

        todos
            .filter(user_id.eq(owner))
            .order_by(created_at.asc())
            .select(TodoRecord::as_select())
            .load(conn)
            .await
    }

    pub async fn get_by_id(
        conn: &mut AsyncPgConnection,
        todo_id: Uuid,
    ) -> QueryResult<Option<TodoRecord>> {
        use crate::schema::todos::dsl::*;

        todos
            .find(todo_id)
            .select(TodoRecord::as_select())
            .first(conn)
            .await
            .optional()
    }

    pub async fn create(conn: &mut AsyncPgConnection, new_todo: &NewTodo) -> QueryResult<TodoRecord> {
        use crate::schema::todos::dsl::*;

        diesel::insert_into(todos)
            .values(new_todo)
            .returning(TodoRecord::as_returning())
            .get_result(conn)
            .await
    }

    pub async fn set_done(
        conn: &mut AsyncPgConnection,
        todo_id: Uuid,
        done_val: bool,
    ) -> QueryResult<Option<TodoRecord>> {
        use crate::schema::todos::dsl::*;

        diesel::update(todos.find(todo_id))
            .set(done.eq(done_val))
            .returning(TodoRecord::as_returning())
            .get_result(conn)
            .await
            .optional()
    }

    pub async fn delete(conn: &mut AsyncPgConnection, todo_id: Uuid) -> QueryResult<usize> {
        use crate::schema::todos::dsl::*;

        diesel::delete(todos.find(todo_id)).execute(conn).await
    }
}

/// Postgres-backed implementation of the store traits.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_provider_id(&self, provider_id: &str) -> StoreResult<Option<User>> {
        let mut conn = self.pool.get().await?;
        Ok(users::find_by_provider_id(&mut conn, provider_id).await?)
    }

    async fn create(&self, user: NewUser) -> StoreResult<User> {
        let mut conn = self.pool.get().await?;
        Ok(users::create(&mut conn, &user).await?)
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn list_by_owner(&self, user_id: Uuid) -> StoreResult<Vec<TodoRecord>> {
        let mut conn = self.pool.get().await?;
        Ok(todos::list_by_owner(&mut conn, user_id).await?)
    }

    async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<TodoRecord>> {
        let mut conn = self.pool.get().await?;
        Ok(todos::get_by_id(&mut conn, id).await?)
    }

    async fn create(&self, todo: NewTodo) -> StoreResult<TodoRecord> {
        let mut conn = self.pool.get().await?;
        Ok(todos::create(&mut conn, &todo).await?)
    }

    async fn set_done(&self, id: Uuid, done: bool) -> StoreResult<Option<TodoRecord>> {
        let mut conn = self.pool.get().await?;
        Ok(todos::set_done(&mut conn, id, done).await?)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut conn = self.pool.get().await?;
        Ok(todos::delete(&mut conn, id).await? > 0)
    }
}
