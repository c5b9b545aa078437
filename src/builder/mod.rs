//! Builder API for ergonomic machine construction.
//!
//! This module provides fluent builders and a macro for declaring states
//! and engines with minimal boilerplate.

pub mod error;
pub mod machine;
pub mod macros;
pub mod state;

pub use error::BuildError;
pub use machine::FsmBuilder;
pub use state::{StateBuilder, TableState, TransitionRule, DEFAULT_KEY_FIELD};

use crate::collection::StateDefinition;
use crate::core::{Environment, State};
use std::sync::Arc;

/// Wrap a state into a shared definition.
///
/// # Example
///
/// ```
/// use stepwise::builder::{share, StateBuilder};
/// use stepwise::collection::StateDefinition;
///
/// let end: StateDefinition = share(StateBuilder::new("End").terminal().build().unwrap());
/// assert_eq!(end.name(), "End");
/// ```
pub fn share<Env, S>(state: S) -> StateDefinition<Env>
where
    Env: Environment,
    S: State<Env> + 'static,
{
    Arc::new(state)
}
