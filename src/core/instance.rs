//! Live state instances and the payloads they carry.

use crate::core::state::StateId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured per-step input: a mapping from field name to value.
///
/// # Example
///
/// ```rust
/// use stepwise::core::Payload;
///
/// let payload = Payload::new().with("value", "3").with("retries", 2);
/// assert_eq!(payload.get_str("value"), Some("3"));
/// assert_eq!(payload.get("retries"), Some(&serde_json::json!(2)));
/// assert!(payload.get("missing").is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Return the payload with `field` set to `value`.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Set `field`, returning the previous value if there was one.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// String value of `field`, if present and a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        )
    }
}

/// A live occurrence of a state definition.
///
/// The engine owns exactly one instance at a time. An instance is never
/// edited in place: each step supersedes it with a fresh one carrying the
/// pulled payload, and each transition supersedes it with an instance of the
/// next state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateInstance {
    state: StateId,
    payload: Payload,
}

impl StateInstance {
    pub fn new(state: StateId, payload: Payload) -> Self {
        Self { state, payload }
    }

    /// Instance of `state` with an empty payload, as created on entry.
    pub fn entered(state: StateId) -> Self {
        Self::new(state, Payload::default())
    }

    pub fn state(&self) -> &StateId {
        &self.state
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_parts(self) -> (StateId, Payload) {
        (self.state, self.payload)
    }
}
