//! Core state machine types.
//!
//! This module contains the pure pieces of the engine:
//! - State definitions via the `State` trait, with their roles and identifiers
//! - Live instances and the payloads that drive each step
//! - Guard predicates for table-driven transitions
//! - Immutable history of resolved transitions

mod guard;
mod history;
mod instance;
mod state;

pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use instance::{Payload, StateInstance};
pub use state::{Environment, State, StateId, StateRole};
