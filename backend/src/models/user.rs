use serde::{Deserialize, Serialize};

use super::entity::{Entity, Resource};
use super::validation::{required, Operation, Rule, Validate};
use crate::impl_merge;

/// Width of the `user.name` column.
pub const NAME_MAX_LEN: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

pub type User = Entity<UserFields>;

impl_merge!(UserFields { name });

fn require_name(user: &UserFields) -> Option<&'static str> {
    required(&user.name, "Required Name")
}

const CREATE_RULES: &[Rule<UserFields>] = &[require_name];

impl Validate for UserFields {
    fn rules(op: Operation) -> &'static [Rule<Self>] {
        match op {
            Operation::Create => CREATE_RULES,
            Operation::Update => &[],
        }
    }
}

impl Resource for UserFields {
    const NAME: &'static str = "User";
    const TABLE: &'static str = "user";
}
