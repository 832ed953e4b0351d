//! Todo HTTP Server Binary
//!
//! Initializes the repository, sets up the HTTP router, and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! # Run with local (in-memory) repository (default)
//! cargo run --bin todo-server
//!
//! # Run with PostgreSQL repository
//! DB_HOST=localhost DB_USER=todo DB_PASS=todo DB_NAME=todos \
//!   cargo run --bin todo-server --features postgres-repo
//! ```
//!
//! # Environment Variables
//!
//! A `.env` file in the working directory is loaded first; variables
//! already set in the environment win.
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 9000)
//! - `ENDPOINT`: Base path for every route (default: none)
//! - `LANGUAGE`: Fallback request language (default: en)
//! - `REPOSITORY_TYPE`, `DATABASE_URL`, `DB_*`, `PG_*`: see `db::factory`
//! - `REPOSITORY_CONFIG`: TOML repository configuration file
//! - `RUST_LOG`: Log filter (default: info)

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use todo_service::config::ServiceConfig;
use todo_service::db::{FullRepository, RepositoryFactory};
use todo_service::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    info!("Starting Todo HTTP Server");

    let config = ServiceConfig::from_env().map_err(anyhow::Error::msg)?;
    let repository = build_repository(&config).await?;
    info!("Repository initialized successfully");

    let state = AppState::new(repository, config.language.as_str());
    let base_path = config.base_path();
    let app = create_router(state, base_path.as_deref());

    let addr = config.bind_addr().map_err(anyhow::Error::msg)?;
    info!(
        "Server listening on http://{}{}",
        addr,
        base_path.as_deref().unwrap_or("")
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_repository(config: &ServiceConfig) -> anyhow::Result<Arc<dyn FullRepository>> {
    let repository = match &config.repository_config {
        Some(path) => {
            info!("Loading repository configuration from {}", path.display());
            RepositoryFactory::from_config_file(path).await
        }
        None => RepositoryFactory::from_env().await,
    };
    repository.context("failed to initialize repository")
}
