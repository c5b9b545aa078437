//! Build errors for state and engine builders.

use crate::collection::CollectionError;
use crate::core::StateId;
use thiserror::Error;

/// Errors that can occur when building states and engines.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("State name is empty. Pass a name to StateBuilder::new")]
    EmptyName,

    #[error("Key field is empty. Call .key_field(name) with a non-empty name")]
    EmptyKeyField,

    #[error("Rule on state '{state}' has an empty target")]
    EmptyTarget { state: StateId },

    #[error("Terminal state '{state}' cannot have transition rules")]
    TerminalWithRules { state: StateId },

    #[error("No inputs configured. Call .inputs(source) before .build()")]
    MissingInputs,

    #[error(transparent)]
    Collection(#[from] CollectionError),
}
