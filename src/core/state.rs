//! The `State` trait and the identifiers that name states.
//!
//! A state is a unit of behavior that reports its role once, when it is
//! registered, and afterwards is only asked one question: given the payload
//! it was entered with, which state comes next?

use crate::collection::StateCollection;
use crate::core::instance::StateInstance;
use crate::effects::TransitEffect;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Bound shared by every environment a state machine can run against.
///
/// The environment is handed to each transit effect when it runs. Use `()`
/// when states need no outside capabilities.
pub trait Environment: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Environment for T {}

/// Classification of a state within a collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateRole {
    /// The unique entry point of the machine
    Initial,
    /// An ordinary stage
    Standard,
    /// A valid exit point; never has a successor
    Terminal,
}

impl StateRole {
    pub fn is_initial(self) -> bool {
        matches!(self, Self::Initial)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal)
    }
}

impl fmt::Display for StateRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Initial => "initial",
            Self::Standard => "standard",
            Self::Terminal => "terminal",
        };
        f.write_str(label)
    }
}

/// Identifier of a state, unique within one collection.
///
/// Derived from [`State::name`]. Lookups accept plain `&str` through
/// `Borrow<str>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(String);

impl StateId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for StateId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StateId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for StateId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for StateId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StateId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Trait for state definitions.
///
/// `name` and `role` must be pure and stable: the collection reads the role
/// exactly once, while validating, and caches it.
///
/// `transit` computes the successor for one step. It receives the live
/// instance (carrying this step's payload) and the whole collection for
/// lookups, and returns an effect that the engine runs against its
/// environment. Returning `None` from a terminal state is expected; from any
/// other state it fails the run. The effect must not keep hidden counters:
/// the same instance must always produce the same successor.
///
/// # Example
///
/// ```rust
/// use stepwise::collection::StateCollection;
/// use stepwise::core::{State, StateInstance, StateRole};
/// use stepwise::effects::{goto, no_successor, TransitEffect};
///
/// struct Door {
///     open: bool,
/// }
///
/// impl State for Door {
///     fn name(&self) -> &str {
///         if self.open { "Open" } else { "Closed" }
///     }
///
///     fn role(&self) -> StateRole {
///         if self.open { StateRole::Terminal } else { StateRole::Initial }
///     }
///
///     fn transit(&self, instance: &StateInstance, _states: &StateCollection) -> TransitEffect {
///         match instance.payload().get_str("action") {
///             Some("push") if !self.open => goto("Open"),
///             _ => no_successor(),
///         }
///     }
/// }
/// ```
pub trait State<Env: Environment = ()>: Send + Sync {
    /// Identifier of this state, unique within a collection.
    fn name(&self) -> &str;

    /// Role of this state. Read once, during collection construction.
    fn role(&self) -> StateRole;

    /// Compute the successor of this state for the given instance.
    fn transit(
        &self,
        instance: &StateInstance,
        states: &StateCollection<Env>,
    ) -> TransitEffect<Env>;

    /// Identifier derived from [`State::name`].
    fn id(&self) -> StateId {
        StateId::new(self.name())
    }
}
