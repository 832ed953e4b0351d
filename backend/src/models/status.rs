use serde::{Deserialize, Serialize};

use super::entity::{Entity, Resource};
use super::validation::{required, Operation, Rule, Validate};
use crate::impl_merge;

/// Width of the `status.status_text` column.
pub const STATUS_TEXT_MAX_LEN: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
}

pub type Status = Entity<StatusFields>;

impl_merge!(StatusFields { status_text });

fn require_status_text(status: &StatusFields) -> Option<&'static str> {
    required(&status.status_text, "Required Status Text")
}

const CREATE_RULES: &[Rule<StatusFields>] = &[require_status_text];

impl Validate for StatusFields {
    fn rules(op: Operation) -> &'static [Rule<Self>] {
        match op {
            Operation::Create => CREATE_RULES,
            Operation::Update => &[],
        }
    }
}

impl Resource for StatusFields {
    const NAME: &'static str = "Status";
    const TABLE: &'static str = "status";
}
