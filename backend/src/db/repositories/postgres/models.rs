use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use super::schema::{statuses, todos, users};
use crate::models::todo::{format_due_date, parse_due_date};
use crate::models::{Draft, Entity, StatusFields, TodoFields, UserFields};

// ---------------------------------------------------------------------------
// user
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserChanges {
    pub updated_at: DateTime<Utc>,
    pub name: Option<String>,
}

impl From<UserRow> for Entity<UserFields> {
    fn from(row: UserRow) -> Self {
        Entity {
            id: row.id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
            fields: UserFields { name: row.name },
        }
    }
}

impl NewUserRow {
    pub fn from_draft(draft: Draft<UserFields>, now: DateTime<Utc>) -> Self {
        Self {
            id: draft.id,
            created_at: now,
            updated_at: now,
            name: draft.fields.name,
        }
    }
}

impl UserChanges {
    pub fn from_fields(fields: UserFields, now: DateTime<Utc>) -> Self {
        Self {
            updated_at: now,
            name: fields.name,
        }
    }
}

// ---------------------------------------------------------------------------
// todo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = todos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TodoRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub person_in_charge: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = todos)]
pub struct NewTodoRow {
    pub id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub person_in_charge: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = todos)]
pub struct TodoChanges {
    pub updated_at: DateTime<Utc>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub person_in_charge: Option<String>,
    pub status: Option<String>,
}

impl From<TodoRow> for Entity<TodoFields> {
    fn from(row: TodoRow) -> Self {
        Entity {
            id: row.id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
            fields: TodoFields {
                title: row.title,
                description: row.description,
                due_date: row.due_date.map(format_due_date),
                person_in_charge: row.person_in_charge,
                status: row.status,
            },
        }
    }
}

fn due_date_column(raw: Option<String>) -> Result<Option<NaiveDate>, String> {
    raw.as_deref().map(parse_due_date).transpose()
}

impl NewTodoRow {
    pub fn from_draft(draft: Draft<TodoFields>, now: DateTime<Utc>) -> Result<Self, String> {
        let fields = draft.fields;
        Ok(Self {
            id: draft.id,
            created_at: now,
            updated_at: now,
            title: fields.title,
            description: fields.description,
            due_date: due_date_column(fields.due_date)?,
            person_in_charge: fields.person_in_charge,
            status: fields.status,
        })
    }
}

impl TodoChanges {
    pub fn from_fields(fields: TodoFields, now: DateTime<Utc>) -> Result<Self, String> {
        Ok(Self {
            updated_at: now,
            title: fields.title,
            description: fields.description,
            due_date: due_date_column(fields.due_date)?,
            person_in_charge: fields.person_in_charge,
            status: fields.status,
        })
    }
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = statuses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StatusRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub status_text: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = statuses)]
pub struct NewStatusRow {
    pub id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status_text: Option<String>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = statuses)]
pub struct StatusChanges {
    pub updated_at: DateTime<Utc>,
    pub status_text: Option<String>,
}

impl From<StatusRow> for Entity<StatusFields> {
    fn from(row: StatusRow) -> Self {
        Entity {
            id: row.id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
            fields: StatusFields {
                status_text: row.status_text,
            },
        }
    }
}

impl NewStatusRow {
    pub fn from_draft(draft: Draft<StatusFields>, now: DateTime<Utc>) -> Self {
        Self {
            id: draft.id,
            created_at: now,
            updated_at: now,
            status_text: draft.fields.status_text,
        }
    }
}

impl StatusChanges {
    pub fn from_fields(fields: StatusFields, now: DateTime<Utc>) -> Self {
        Self {
            updated_at: now,
            status_text: fields.status_text,
        }
    }
}
