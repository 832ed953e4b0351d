//! Resource definitions: the stored record shape, the three field sets, and
//! the validation and merge rules that apply to them.

pub mod entity;
pub mod macros;
pub mod status;
pub mod todo;
pub mod user;
pub mod validation;

pub use entity::{Draft, Entity, Merge, Patch, Resource};
pub use status::{Status, StatusFields};
pub use todo::{Todo, TodoFields};
pub use user::{User, UserFields};
pub use validation::{Operation, Rule, Validate};
