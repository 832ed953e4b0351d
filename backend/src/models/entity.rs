//! Persisted record shape shared by every resource.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::Validate;

/// A stored row: server-managed columns plus the resource's own fields.
///
/// Serializes flat, e.g. `{"id":1,"created_at":..,"updated_at":..,"name":"x"}`.
/// `deleted_at` never leaves the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity<F> {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: F,
}

impl<F> Entity<F> {
    /// Build a fresh, live row stamped with `now` for both timestamps.
    pub fn new(id: i64, fields: F, now: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            fields,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Create payload: the resource fields plus an optional caller-chosen id.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Draft<F> {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(flatten)]
    pub fields: F,
}

impl<F> Draft<F> {
    pub fn new(fields: F) -> Self {
        Self { id: None, fields }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

/// Update payload: the resource fields, accepted only as a JSON object.
///
/// Wrapping in `Option` lets a bare `null` body stand for an empty patch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Patch<F> {
    #[serde(flatten)]
    pub fields: F,
}

impl<F: Default> Patch<F> {
    /// The field set of an optional patch; `None` yields all-absent fields.
    pub fn into_fields(patch: Option<Self>) -> F {
        patch.map(|p| p.fields).unwrap_or_default()
    }
}

/// Overlay a partial payload onto stored values.
pub trait Merge {
    fn merge(&mut self, patch: Self);
}

/// The field set of one HTTP resource.
///
/// Every field is optional so the same type serves as create payload,
/// update patch and stored value.
pub trait Resource:
    Validate
    + Merge
    + Clone
    + Default
    + std::fmt::Debug
    + Serialize
    + serde::de::DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Human-readable entity name, as used in `Duplicate <Entity>`.
    const NAME: &'static str;
    /// Backing table name.
    const TABLE: &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TodoFields, UserFields};

    #[test]
    fn patch_accepts_objects_only() {
        let patch: Option<Patch<UserFields>> = serde_json::from_str(r#"{"name":"Ayu"}"#).unwrap();
        assert_eq!(Patch::into_fields(patch).name.as_deref(), Some("Ayu"));

        let positional =
            serde_json::from_str::<Option<Patch<TodoFields>>>(r#"["x",null,null,null,"Open"]"#);
        assert!(positional.is_err());
    }

    #[test]
    fn null_patch_is_empty() {
        let patch: Option<Patch<TodoFields>> = serde_json::from_str("null").unwrap();
        assert_eq!(Patch::into_fields(patch), TodoFields::default());
    }
}
