use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_backend::auth::{GoogleProvider, Providers};
use todo_backend::config::AppConfig;
use todo_backend::db::{self, PgStore};
use todo_backend::memory::MemoryStore;
use todo_backend::repository::{TodoStore, UserStore};
use todo_backend::{create_app, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::parse();
    let auth_config = config.auth_config()?;

    tracing::info!("Starting todo backend server");

    let (users, todos): (Arc<dyn UserStore>, Arc<dyn TodoStore>) = if config.memory {
        tracing::warn!("Using in-memory store; data is lost on restart");
        let store = Arc::new(MemoryStore::new());
        (store.clone(), store)
    } else {
        let database_url = config
            .database_url
            .as_deref()
            .context("DATABASE_URL must be set")?;
        let store = Arc::new(PgStore::new(db::establish_connection_pool(database_url)?));
        tracing::info!("Database connection pool initialized");
        (store.clone(), store)
    };

    let providers = Providers::new().with(GoogleProvider::new(
        &config.google_client_id,
        &config.google_client_secret,
        &config.google_callback_url,
    ));

    let state = AppState::new(auth_config, users, todos, providers);
    let app = create_app(state, config.cors_layer());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
