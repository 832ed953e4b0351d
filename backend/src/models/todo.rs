use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, Resource};
use super::validation::{required, Operation, Rule, Validate};
use crate::impl_merge;

/// Width of the `todo.person_in_charge` column.
pub const PERSON_IN_CHARGE_MAX_LEN: usize = 256;
/// Width of the `todo.status` column.
pub const STATUS_MAX_LEN: usize = 10;

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_in_charge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

pub type Todo = Entity<TodoFields>;

impl_merge!(TodoFields {
    title,
    description,
    due_date,
    person_in_charge,
    status,
});

fn require_title(todo: &TodoFields) -> Option<&'static str> {
    required(&todo.title, "Required Title")
}

fn require_due_date(todo: &TodoFields) -> Option<&'static str> {
    required(&todo.due_date, "Required Due Date")
}

fn require_description(todo: &TodoFields) -> Option<&'static str> {
    required(&todo.description, "Required Description")
}

fn require_person_in_charge(todo: &TodoFields) -> Option<&'static str> {
    required(&todo.person_in_charge, "Required Person in Charge")
}

fn require_status(todo: &TodoFields) -> Option<&'static str> {
    required(&todo.status, "Required Status")
}

fn reject_closed_status(todo: &TodoFields) -> Option<&'static str> {
    match todo.status.as_deref() {
        Some("Done") => Some("Can't Change Status When is Done"),
        Some("Delete") => Some("Can't Change Status When is Delete"),
        _ => None,
    }
}

const CREATE_RULES: &[Rule<TodoFields>] = &[
    require_title,
    require_due_date,
    require_description,
    require_person_in_charge,
    require_status,
];

const UPDATE_RULES: &[Rule<TodoFields>] = &[reject_closed_status];

impl Validate for TodoFields {
    fn rules(op: Operation) -> &'static [Rule<Self>] {
        match op {
            Operation::Create => CREATE_RULES,
            Operation::Update => UPDATE_RULES,
        }
    }
}

impl Resource for TodoFields {
    const NAME: &'static str = "Todo";
    const TABLE: &'static str = "todo";
}

/// Parse a wire due date into the `date` column type.
///
/// The error text mirrors what Postgres reports for the same input.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), DUE_DATE_FORMAT)
        .map_err(|_| format!("invalid input syntax for type date: \"{}\"", raw))
}

pub fn format_due_date(date: NaiveDate) -> String {
    date.format(DUE_DATE_FORMAT).to_string()
}
