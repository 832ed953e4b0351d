//! Field presence and value rules, keyed by operation.

/// The operation a payload is being validated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
}

/// A single check; returns the failure message when the rule is violated.
pub type Rule<T> = fn(&T) -> Option<&'static str>;

/// Ordered rule tables per operation. The first failing rule wins.
pub trait Validate: Sized + 'static {
    /// Rules applied for `op`, in evaluation order. An empty table accepts
    /// every payload.
    fn rules(op: Operation) -> &'static [Rule<Self>];

    fn validate(&self, op: Operation) -> Option<String> {
        Self::rules(op)
            .iter()
            .find_map(|rule| rule(self))
            .map(str::to_owned)
    }
}

/// Presence check: `Some("")` passes, only `None` fails.
pub fn required<T>(value: &Option<T>, message: &'static str) -> Option<&'static str> {
    match value {
        Some(_) => None,
        None => Some(message),
    }
}
