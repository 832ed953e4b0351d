//! Repository trait definitions for database operations.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//!
//! # Trait Composition
//!
//! [`EntityRepository`] is the single-table CRUD surface, generic over the
//! resource field set. A backend implements it once per table and exposes
//! the three tables through [`FullRepository`], which is what the HTTP layer
//! holds:
//!
//! ```ignore
//! async fn count_todos(repo: &dyn FullRepository) -> RepositoryResult<usize> {
//!     Ok(repo.todos().list().await?.len())
//! }
//! ```

pub mod error;

use async_trait::async_trait;

pub use error::{ErrorContext, RepositoryError, RepositoryResult, RECORD_NOT_FOUND};

use crate::models::{Draft, Entity, Resource, StatusFields, TodoFields, UserFields};

/// Single-row CRUD against one table.
///
/// Lookups and writes only see live rows: a row whose `deleted_at` is set
/// behaves as absent, except that its id stays taken.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait EntityRepository<F: Resource>: Send + Sync {
    /// Insert a new row, stamping both timestamps.
    ///
    /// # Returns
    /// * `Ok(Entity)` - The stored row including its assigned id
    /// * `Err(RepositoryError::ConstraintViolation)` - If the id is already taken
    /// * `Err(RepositoryError)` - Any other storage failure
    async fn insert(&self, draft: Draft<F>) -> RepositoryResult<Entity<F>>;

    /// All live rows in id order.
    async fn list(&self) -> RepositoryResult<Vec<Entity<F>>>;

    /// Fetch a live row by id.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no live row has this id
    async fn find(&self, id: i64) -> RepositoryResult<Entity<F>>;

    /// Persist the fields of `entity` onto its row and bump `updated_at`.
    ///
    /// Fields that are `None` are left as stored.
    async fn update(&self, entity: &Entity<F>) -> RepositoryResult<Entity<F>>;

    /// Mark a live row as deleted.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no live row has this id
    async fn soft_delete(&self, id: i64) -> RepositoryResult<()>;
}

/// The complete storage backend: one repository per resource plus a
/// connectivity probe.
#[async_trait]
pub trait FullRepository: Send + Sync {
    /// Check if the database connection is healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    fn users(&self) -> &dyn EntityRepository<UserFields>;

    fn todos(&self) -> &dyn EntityRepository<TodoFields>;

    fn statuses(&self) -> &dyn EntityRepository<StatusFields>;
}

/// Picks a resource's repository out of a [`FullRepository`], so code that
/// is generic over the field set can reach its table.
pub trait Stored: Resource {
    fn repository(repo: &dyn FullRepository) -> &dyn EntityRepository<Self>;
}

impl Stored for UserFields {
    fn repository(repo: &dyn FullRepository) -> &dyn EntityRepository<Self> {
        repo.users()
    }
}

impl Stored for TodoFields {
    fn repository(repo: &dyn FullRepository) -> &dyn EntityRepository<Self> {
        repo.todos()
    }
}

impl Stored for StatusFields {
    fn repository(repo: &dyn FullRepository) -> &dyn EntityRepository<Self> {
        repo.statuses()
    }
}
