//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic migration execution (schema sync) on construction
//! - One statement per operation; atomicity is the engine's
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL`: Connection string; when unset the string is assembled
//!   from `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASS`, `DB_NAME`
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_MIN_IDLE`: Idle connections kept open (default: 1)
//! - `PG_MAX_LIFETIME_SEC`: Connection lifetime in seconds (default: 5)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)

use async_trait::async_trait;
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;
use tracing::info;

use crate::db::config::DbConfig;
use crate::db::repository::{
    EntityRepository, ErrorContext, FullRepository, RepositoryError, RepositoryResult,
    RECORD_NOT_FOUND,
};
use crate::models::{Draft, Entity, StatusFields, TodoFields, UserFields};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL or libpq keyword/value string
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Number of idle connections the pool keeps open
    pub min_idle: u32,
    /// Lifetime of a pooled connection in seconds
    pub max_lifetime_sec: u64,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_idle: 1,
            max_lifetime_sec: 5,
            connection_timeout_sec: 30,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    /// Returns an error if neither `DATABASE_URL` nor the `DB_*` variables
    /// describe a database.
    pub fn from_env() -> Result<Self, String> {
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => DbConfig::from_env()?.connection_string(),
        };

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_idle: env_or("PG_MIN_IDLE", defaults.min_idle),
            max_lifetime_sec: env_or("PG_MAX_LIFETIME_SEC", defaults.max_lifetime_sec),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    ///
    /// # Returns
    /// * `Ok(PostgresRepository)` on success
    /// * `Err(RepositoryError)` if connection or migration fails
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_idle))
            .max_lifetime(Some(Duration::from_secs(config.max_lifetime_sec)))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        info!(
            max_pool_size = config.max_pool_size,
            min_idle = config.min_idle,
            "Postgres repository ready"
        );
        Ok(Self { pool })
    }

    /// Run pending database migrations.
    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Run a blocking Diesel operation on a pooled connection.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection"),
                )
            })?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

fn not_found() -> RepositoryError {
    RepositoryError::not_found(RECORD_NOT_FOUND)
}

#[async_trait]
impl FullRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    fn users(&self) -> &dyn EntityRepository<UserFields> {
        self
    }

    fn todos(&self) -> &dyn EntityRepository<TodoFields> {
        self
    }

    fn statuses(&self) -> &dyn EntityRepository<StatusFields> {
        self
    }
}

// ==================== user ====================

#[async_trait]
impl EntityRepository<UserFields> for PostgresRepository {
    async fn insert(&self, draft: Draft<UserFields>) -> RepositoryResult<Entity<UserFields>> {
        let row = NewUserRow::from_draft(draft, Utc::now());
        self.with_conn(move |conn| {
            diesel::insert_into(users::table)
                .values(&row)
                .returning(UserRow::as_returning())
                .get_result::<UserRow>(conn)
                .map(Into::into)
                .map_err(map_diesel_error)
        })
        .await
        .map_err(|e| e.within("insert", "user", None))
    }

    async fn list(&self) -> RepositoryResult<Vec<Entity<UserFields>>> {
        self.with_conn(|conn| {
            let rows = users::table
                .filter(users::deleted_at.is_null())
                .order(users::id.asc())
                .select(UserRow::as_select())
                .load::<UserRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
        .map_err(|e| e.within("list", "user", None))
    }

    async fn find(&self, id: i64) -> RepositoryResult<Entity<UserFields>> {
        self.with_conn(move |conn| {
            users::table
                .filter(users::id.eq(id))
                .filter(users::deleted_at.is_null())
                .select(UserRow::as_select())
                .first::<UserRow>(conn)
                .map(Into::into)
                .map_err(map_diesel_error)
        })
        .await
        .map_err(|e| e.within("find", "user", Some(id)))
    }

    async fn update(&self, entity: &Entity<UserFields>) -> RepositoryResult<Entity<UserFields>> {
        let id = entity.id;
        let changes = UserChanges::from_fields(entity.fields.clone(), Utc::now());
        self.with_conn(move |conn| {
            diesel::update(
                users::table
                    .filter(users::id.eq(id))
                    .filter(users::deleted_at.is_null()),
            )
            .set(&changes)
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(conn)
            .map(Into::into)
            .map_err(map_diesel_error)
        })
        .await
        .map_err(|e| e.within("update", "user", Some(id)))
    }

    async fn soft_delete(&self, id: i64) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let affected = diesel::update(
                users::table
                    .filter(users::id.eq(id))
                    .filter(users::deleted_at.is_null()),
            )
            .set(users::deleted_at.eq(Some(Utc::now())))
            .execute(conn)
            .map_err(map_diesel_error)?;
            if affected == 0 {
                return Err(not_found());
            }
            Ok(())
        })
        .await
        .map_err(|e| e.within("soft_delete", "user", Some(id)))
    }
}

// ==================== todo ====================

#[async_trait]
impl EntityRepository<TodoFields> for PostgresRepository {
    async fn insert(&self, draft: Draft<TodoFields>) -> RepositoryResult<Entity<TodoFields>> {
        let row = NewTodoRow::from_draft(draft, Utc::now())
            .map_err(|e| RepositoryError::query_with_context(e, ErrorContext::new("insert")))?;
        self.with_conn(move |conn| {
            diesel::insert_into(todos::table)
                .values(&row)
                .returning(TodoRow::as_returning())
                .get_result::<TodoRow>(conn)
                .map(Into::into)
                .map_err(map_diesel_error)
        })
        .await
        .map_err(|e| e.within("insert", "todo", None))
    }

    async fn list(&self) -> RepositoryResult<Vec<Entity<TodoFields>>> {
        self.with_conn(|conn| {
            let rows = todos::table
                .filter(todos::deleted_at.is_null())
                .order(todos::id.asc())
                .select(TodoRow::as_select())
                .load::<TodoRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
        .map_err(|e| e.within("list", "todo", None))
    }

    async fn find(&self, id: i64) -> RepositoryResult<Entity<TodoFields>> {
        self.with_conn(move |conn| {
            todos::table
                .filter(todos::id.eq(id))
                .filter(todos::deleted_at.is_null())
                .select(TodoRow::as_select())
                .first::<TodoRow>(conn)
                .map(Into::into)
                .map_err(map_diesel_error)
        })
        .await
        .map_err(|e| e.within("find", "todo", Some(id)))
    }

    async fn update(&self, entity: &Entity<TodoFields>) -> RepositoryResult<Entity<TodoFields>> {
        let id = entity.id;
        let changes = TodoChanges::from_fields(entity.fields.clone(), Utc::now()).map_err(|e| {
            RepositoryError::query_with_context(e, ErrorContext::new("update").with_entity_id(id))
        })?;
        self.with_conn(move |conn| {
            diesel::update(
                todos::table
                    .filter(todos::id.eq(id))
                    .filter(todos::deleted_at.is_null()),
            )
            .set(&changes)
            .returning(TodoRow::as_returning())
            .get_result::<TodoRow>(conn)
            .map(Into::into)
            .map_err(map_diesel_error)
        })
        .await
        .map_err(|e| e.within("update", "todo", Some(id)))
    }

    async fn soft_delete(&self, id: i64) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let affected = diesel::update(
                todos::table
                    .filter(todos::id.eq(id))
                    .filter(todos::deleted_at.is_null()),
            )
            .set(todos::deleted_at.eq(Some(Utc::now())))
            .execute(conn)
            .map_err(map_diesel_error)?;
            if affected == 0 {
                return Err(not_found());
            }
            Ok(())
        })
        .await
        .map_err(|e| e.within("soft_delete", "todo", Some(id)))
    }
}

// ==================== status ====================

#[async_trait]
impl EntityRepository<StatusFields> for PostgresRepository {
    async fn insert(&self, draft: Draft<StatusFields>) -> RepositoryResult<Entity<StatusFields>> {
        let row = NewStatusRow::from_draft(draft, Utc::now());
        self.with_conn(move |conn| {
            diesel::insert_into(statuses::table)
                .values(&row)
                .returning(StatusRow::as_returning())
                .get_result::<StatusRow>(conn)
                .map(Into::into)
                .map_err(map_diesel_error)
        })
        .await
        .map_err(|e| e.within("insert", "status", None))
    }

    async fn list(&self) -> RepositoryResult<Vec<Entity<StatusFields>>> {
        self.with_conn(|conn| {
            let rows = statuses::table
                .filter(statuses::deleted_at.is_null())
                .order(statuses::id.asc())
                .select(StatusRow::as_select())
                .load::<StatusRow>(conn)
                .map_err(map_diesel_error)?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
        .map_err(|e| e.within("list", "status", None))
    }

    async fn find(&self, id: i64) -> RepositoryResult<Entity<StatusFields>> {
        self.with_conn(move |conn| {
            statuses::table
                .filter(statuses::id.eq(id))
                .filter(statuses::deleted_at.is_null())
                .select(StatusRow::as_select())
                .first::<StatusRow>(conn)
                .map(Into::into)
                .map_err(map_diesel_error)
        })
        .await
        .map_err(|e| e.within("find", "status", Some(id)))
    }

    async fn update(
        &self,
        entity: &Entity<StatusFields>,
    ) -> RepositoryResult<Entity<StatusFields>> {
        let id = entity.id;
        let changes = StatusChanges::from_fields(entity.fields.clone(), Utc::now());
        self.with_conn(move |conn| {
            diesel::update(
                statuses::table
                    .filter(statuses::id.eq(id))
                    .filter(statuses::deleted_at.is_null()),
            )
            .set(&changes)
            .returning(StatusRow::as_returning())
            .get_result::<StatusRow>(conn)
            .map(Into::into)
            .map_err(map_diesel_error)
        })
        .await
        .map_err(|e| e.within("update", "status", Some(id)))
    }

    async fn soft_delete(&self, id: i64) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let affected = diesel::update(
                statuses::table
                    .filter(statuses::id.eq(id))
                    .filter(statuses::deleted_at.is_null()),
            )
            .set(statuses::deleted_at.eq(Some(Utc::now())))
            .execute(conn)
            .map_err(map_diesel_error)?;
            if affected == 0 {
                return Err(not_found());
            }
            Ok(())
        })
        .await
        .map_err(|e| e.within("soft_delete", "status", Some(id)))
    }
}
