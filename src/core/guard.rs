//! Guard predicates for choosing transitions.
//!
//! Guards are pure boolean functions over a step's payload. Table-driven
//! states pair each guard with a target and take the first one that holds.

use super::instance::Payload;
use serde_json::Value;

/// Pure predicate deciding whether a transition rule applies.
///
/// # Example
///
/// ```rust
/// use stepwise::core::{Guard, Payload};
///
/// let is_three = Guard::field_equals("value", "3");
///
/// assert!(is_three.check(&Payload::new().with("value", "3")));
/// assert!(!is_three.check(&Payload::new().with("value", "2")));
/// assert!(!is_three.check(&Payload::new()));
/// ```
pub struct Guard<T = Payload> {
    predicate: Box<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Guard<T> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic and free of side effects:
    /// transit is required to give the same answer for the same input.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    pub fn check(&self, input: &T) -> bool {
        (self.predicate)(input)
    }
}

impl Guard<Payload> {
    /// Guard that holds when `field` is present and equal to `expected`.
    pub fn field_equals(field: impl Into<String>, expected: impl Into<Value>) -> Self {
        let field = field.into();
        let expected = expected.into();
        Guard::new(move |payload: &Payload| payload.get(&field) == Some(&expected))
    }

    /// Guard that holds when `field` is present, whatever its value.
    pub fn field_present(field: impl Into<String>) -> Self {
        let field = field.into();
        Guard::new(move |payload: &Payload| payload.get(&field).is_some())
    }
}

impl<T> std::fmt::Debug for Guard<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Guard(..)")
    }
}
