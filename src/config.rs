//! Engine configuration.

use serde::{Deserialize, Serialize};

/// What a run does when its inputs end before a terminal state is reached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// End the run normally, leaving the engine in the last state reached.
    /// The caller tells the two outcomes apart by inspecting the role of the
    /// current state.
    #[default]
    Allow,

    /// Fail the run with [`RunError::InputExhausted`](crate::effects::RunError::InputExhausted).
    Reject,
}

/// Configuration for a single engine.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use stepwise::config::{ExhaustionPolicy, FsmConfig};
///
/// let config = FsmConfig::from_json(r#"{ "exhaustion": "reject" }"#).unwrap();
/// assert_eq!(config.exhaustion, ExhaustionPolicy::Reject);
/// assert!(config.log_transitions);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsmConfig {
    /// Outcome of running out of input in a non-terminal state
    pub exhaustion: ExhaustionPolicy,

    /// Log every resolved transition at info level
    pub log_transitions: bool,

    /// Keep an in-memory history of resolved transitions
    pub record_history: bool,
}

impl Default for FsmConfig {
    fn default() -> Self {
        Self {
            exhaustion: ExhaustionPolicy::Allow,
            log_transitions: true,
            record_history: true,
        }
    }
}

impl FsmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exhaustion(mut self, policy: ExhaustionPolicy) -> Self {
        self.exhaustion = policy;
        self
    }

    pub fn log_transitions(mut self, enabled: bool) -> Self {
        self.log_transitions = enabled;
        self
    }

    pub fn record_history(mut self, enabled: bool) -> Self {
        self.record_history = enabled;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
