//! In-memory local repository implementation.
//!
//! This module provides a local implementation of the repository traits
//! suitable for unit testing and local development. Each table is a
//! `BTreeMap` keyed by id behind its own lock, and mimics the Postgres
//! schema closely enough that handlers see the same error kinds:
//!
//! - ids come from a per-table sequence that explicit ids do not advance;
//! - the primary key is unique across live and soft-deleted rows;
//! - varchar widths and the `date` type of `todo.due_date` are enforced.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::db::repository::{
    EntityRepository, ErrorContext, FullRepository, RepositoryError, RepositoryResult,
    RECORD_NOT_FOUND,
};
use crate::models::status::STATUS_TEXT_MAX_LEN;
use crate::models::todo::{
    format_due_date, parse_due_date, PERSON_IN_CHARGE_MAX_LEN, STATUS_MAX_LEN,
};
use crate::models::user::NAME_MAX_LEN;
use crate::models::{Draft, Entity, Merge, Resource, StatusFields, TodoFields, UserFields};

/// Column rules a field set must satisfy before it is written.
pub trait LocalSchema: Resource {
    /// Check widths and coerce typed columns, returning the value as it
    /// would be read back.
    fn normalize(fields: Self) -> Result<Self, String>;
}

fn check_width(value: &Option<String>, max: usize) -> Result<(), String> {
    match value {
        Some(v) if v.chars().count() > max => Err(format!(
            "value too long for type character varying({})",
            max
        )),
        _ => Ok(()),
    }
}

impl LocalSchema for UserFields {
    fn normalize(fields: Self) -> Result<Self, String> {
        check_width(&fields.name, NAME_MAX_LEN)?;
        Ok(fields)
    }
}

impl LocalSchema for StatusFields {
    fn normalize(fields: Self) -> Result<Self, String> {
        check_width(&fields.status_text, STATUS_TEXT_MAX_LEN)?;
        Ok(fields)
    }
}

impl LocalSchema for TodoFields {
    fn normalize(mut fields: Self) -> Result<Self, String> {
        check_width(&fields.person_in_charge, PERSON_IN_CHARGE_MAX_LEN)?;
        check_width(&fields.status, STATUS_MAX_LEN)?;
        if let Some(raw) = fields.due_date.take() {
            fields.due_date = Some(format_due_date(parse_due_date(&raw)?));
        }
        Ok(fields)
    }
}

struct TableData<F> {
    rows: BTreeMap<i64, Entity<F>>,
    next_id: i64,
}

/// One in-memory table.
pub struct LocalTable<F> {
    data: RwLock<TableData<F>>,
}

impl<F> Default for LocalTable<F> {
    fn default() -> Self {
        Self {
            data: RwLock::new(TableData {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl<F: Resource> LocalTable<F> {
    fn context(operation: &str) -> ErrorContext {
        ErrorContext::new(operation).with_entity(F::TABLE)
    }

    fn not_found(operation: &str, id: i64) -> RepositoryError {
        RepositoryError::not_found_with_context(
            RECORD_NOT_FOUND,
            Self::context(operation).with_entity_id(id),
        )
    }

    /// Number of rows physically stored, soft-deleted ones included.
    pub fn stored_rows(&self) -> usize {
        self.data.read().rows.len()
    }

    /// Fetch a row by id regardless of its deletion marker.
    pub fn raw_row(&self, id: i64) -> Option<Entity<F>> {
        self.data.read().rows.get(&id).cloned()
    }
}

#[async_trait]
impl<F: LocalSchema> EntityRepository<F> for LocalTable<F> {
    async fn insert(&self, draft: Draft<F>) -> RepositoryResult<Entity<F>> {
        let fields = F::normalize(draft.fields)
            .map_err(|e| RepositoryError::query_with_context(e, Self::context("insert")))?;

        let mut data = self.data.write();
        let id = match draft.id {
            Some(id) => id,
            None => {
                let id = data.next_id;
                data.next_id += 1;
                id
            }
        };

        if data.rows.contains_key(&id) {
            return Err(RepositoryError::constraint_with_context(
                format!(
                    "duplicate key value violates unique constraint \"{}_pkey\"",
                    F::TABLE
                ),
                Self::context("insert")
                    .with_entity_id(id)
                    .with_details(format!("Key (id)=({}) already exists.", id)),
            ));
        }

        let entity = Entity::new(id, fields, Utc::now());
        data.rows.insert(id, entity.clone());
        debug!(table = F::TABLE, id, "inserted row");
        Ok(entity)
    }

    async fn list(&self) -> RepositoryResult<Vec<Entity<F>>> {
        let data = self.data.read();
        Ok(data
            .rows
            .values()
            .filter(|row| !row.is_deleted())
            .cloned()
            .collect())
    }

    async fn find(&self, id: i64) -> RepositoryResult<Entity<F>> {
        let data = self.data.read();
        data.rows
            .get(&id)
            .filter(|row| !row.is_deleted())
            .cloned()
            .ok_or_else(|| Self::not_found("find", id))
    }

    async fn update(&self, entity: &Entity<F>) -> RepositoryResult<Entity<F>> {
        let fields = F::normalize(entity.fields.clone()).map_err(|e| {
            RepositoryError::query_with_context(e, Self::context("update").with_entity_id(entity.id))
        })?;

        let mut data = self.data.write();
        let row = data
            .rows
            .get_mut(&entity.id)
            .filter(|row| !row.is_deleted())
            .ok_or_else(|| Self::not_found("update", entity.id))?;

        row.fields.merge(fields);
        row.updated_at = Utc::now();
        debug!(table = F::TABLE, id = entity.id, "updated row");
        Ok(row.clone())
    }

    async fn soft_delete(&self, id: i64) -> RepositoryResult<()> {
        let mut data = self.data.write();
        let row = data
            .rows
            .get_mut(&id)
            .filter(|row| !row.is_deleted())
            .ok_or_else(|| Self::not_found("soft_delete", id))?;

        row.deleted_at = Some(Utc::now());
        debug!(table = F::TABLE, id, "soft-deleted row");
        Ok(())
    }
}

/// In-memory local repository.
///
/// # Example
/// ```
/// use todo_service::db::repositories::LocalRepository;
/// use todo_service::db::repository::FullRepository;
/// use todo_service::models::{Draft, UserFields};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let repo = LocalRepository::new();
/// let user = repo
///     .users()
///     .insert(Draft::new(UserFields { name: Some("Ayu".into()) }))
///     .await
///     .unwrap();
/// assert_eq!(user.id, 1);
/// # });
/// ```
#[derive(Clone, Default)]
pub struct LocalRepository {
    users: Arc<LocalTable<UserFields>>,
    todos: Arc<LocalTable<TodoFields>>,
    statuses: Arc<LocalTable<StatusFields>>,
    unhealthy: Arc<AtomicBool>,
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.unhealthy.store(!healthy, Ordering::Relaxed);
    }

    pub fn user_table(&self) -> &LocalTable<UserFields> {
        &self.users
    }

    pub fn todo_table(&self) -> &LocalTable<TodoFields> {
        &self.todos
    }

    pub fn status_table(&self) -> &LocalTable<StatusFields> {
        &self.statuses
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(!self.unhealthy.load(Ordering::Relaxed))
    }

    fn users(&self) -> &dyn EntityRepository<UserFields> {
        self.users.as_ref()
    }

    fn todos(&self) -> &dyn EntityRepository<TodoFields> {
        self.todos.as_ref()
    }

    fn statuses(&self) -> &dyn EntityRepository<StatusFields> {
        self.statuses.as_ref()
    }
}
