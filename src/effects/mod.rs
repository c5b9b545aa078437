//! The effectful shell: transit effects and the engine that runs them.
//!
//! States decide their successor through Stillwater effects, so a decision
//! can read the environment or await I/O without the engine knowing. The
//! engine owns ordering: exactly one step is in flight at a time.
//!
//! # Key Concepts
//!
//! - **Transit effects**: `BoxedEffect`s resolving to the next state or none
//! - **Engine**: `Fsm` validates the states, pulls inputs and applies transitions
//! - **Observers**: hooks run after each resolved transition (logging by default)

mod machine;
mod transition;

pub use machine::{Fsm, RunError, RunOutcome, RunStatus};
pub use transition::{
    goto, no_successor, transit_failed, LogTransitions, TransitEffect, TransitionError,
    TransitionObserver,
};
