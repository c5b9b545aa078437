//! In-memory record of the transitions taken during a run.

use super::state::StateId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single resolved transition.
///
/// # Example
///
/// ```rust
/// use stepwise::core::{StateId, StateTransition};
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: StateId::new("Start"),
///     to: StateId::new("S1"),
///     timestamp: Utc::now(),
///     step: 1,
/// };
/// assert_eq!(transition.to.as_str(), "S1");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state being left
    pub from: StateId,
    /// The state being entered
    pub to: StateId,
    /// When the transition was resolved
    pub timestamp: DateTime<Utc>,
    /// One-based index of the step (input) that caused it
    pub step: usize,
}

/// Ordered history of transitions.
///
/// History is immutable - `record` returns a new history with the
/// transition appended.
///
/// # Example
///
/// ```rust
/// use stepwise::core::{StateHistory, StateId, StateTransition};
/// use chrono::Utc;
///
/// let history = StateHistory::new()
///     .record(StateTransition {
///         from: StateId::new("Start"),
///         to: StateId::new("S1"),
///         timestamp: Utc::now(),
///         step: 1,
///     })
///     .record(StateTransition {
///         from: StateId::new("S1"),
///         to: StateId::new("End"),
///         timestamp: Utc::now(),
///         step: 2,
///     });
///
/// let path: Vec<&str> = history.get_path().into_iter().map(StateId::as_str).collect();
/// assert_eq!(path, ["Start", "S1", "End"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<StateTransition>,
}

impl StateHistory {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: StateTransition) -> Self {
        let mut history = self.clone();
        history.push(transition);
        history
    }

    /// Append in place. The engine records one transition per input.
    pub(crate) fn push(&mut self, transition: StateTransition) {
        self.transitions.push(transition);
    }

    /// Get the path of states traversed.
    ///
    /// The first element is the `from` of the first transition, followed by
    /// the `to` of every transition. Empty when nothing was recorded.
    pub fn get_path(&self) -> Vec<&StateId> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Time between the first and the last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
