//! Validation errors for state collections.

use crate::core::StateId;
use thiserror::Error;

/// Errors raised while validating a list of state definitions.
///
/// Each one means the list itself is wrong; the engine cannot be built until
/// the definitions are fixed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CollectionError {
    #[error("No state with the initial role was provided")]
    InitialStateNotProvided,

    #[error("Multiple initial states provided: {}", join(.states))]
    MultipleInitialStatesProvided { states: Vec<StateId> },

    #[error("No state with the terminal role was provided")]
    EndStateNotProvided,

    #[error("State '{name}' was provided more than once")]
    DuplicateState { name: StateId },
}

fn join(states: &[StateId]) -> String {
    states
        .iter()
        .map(StateId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
