//! Storage for users, todos and statuses.
//!
//! The HTTP layer only sees [`FullRepository`]; which backend sits behind it
//! is decided once at startup by [`RepositoryFactory`].
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  HTTP handlers (generic over the resource)  │
//! └──────────────────────┬──────────────────────┘
//!                        │ Arc<dyn FullRepository>
//! ┌──────────────────────▼──────────────────────┐
//! │  Repository traits (repository/mod.rs)      │
//! └──────────┬───────────────────────┬──────────┘
//!            │                       │
//!   ┌────────▼────────┐     ┌────────▼────────┐
//!   │ LocalRepository │     │ Postgres/Diesel │
//!   │   (in-memory)   │     │ (postgres-repo) │
//!   └─────────────────┘     └─────────────────┘
//! ```

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod config;
pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use config::DbConfig;
pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::{PostgresConfig, PostgresRepository};
pub use repository::{
    EntityRepository, ErrorContext, FullRepository, RepositoryError, RepositoryResult, Stored,
};

/// Placeholder so configuration code compiles without the Postgres backend.
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}
