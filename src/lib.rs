//! Stepwise: a forward-only async finite state machine engine
//!
//! Each state in a Stepwise machine decides its own successor. The engine
//! validates the set of states once, then feeds inputs to the current state
//! one at a time, moving to whatever state it names, until a terminal state
//! is reached or the inputs run out.
//!
//! Stepwise follows Stillwater's "pure core, imperative shell" philosophy:
//! states, roles, guards and history are plain values, while a state's
//! decision is an Effect run against the caller's environment.
//!
//! # Core Concepts
//!
//! - **State**: a definition with a name, a role (initial, standard or
//!   terminal) and a `transit` effect choosing the next state
//! - **StateCollection**: the validated, read-only index of states
//! - **InputSource**: a lazy, finite stream of payloads, one per step
//! - **Fsm**: the engine that drives a single run
//!
//! # Example
//!
//! ```rust
//! use stepwise::collection::StateDefinition;
//! use stepwise::effects::{Fsm, RunStatus};
//! use stepwise::input::InputSource;
//! use stepwise::table_states;
//!
//! # futures::executor::block_on(async {
//! let states: Vec<StateDefinition> = table_states! {
//!     Start: initial { "1" => S1 };
//!     S1 { "3" => S3, "2" => S2 };
//!     S2 { "4" => End };
//!     S3 { "3" => S3, "2" => S2, "1" => S1 };
//!     End: terminal;
//! }
//! .unwrap();
//!
//! let inputs = InputSource::from_values("value", ["1", "3", "1", "3", "3", "2", "4"]);
//! let mut fsm = Fsm::new(states, inputs).unwrap();
//!
//! let outcome = fsm.run(&()).await.unwrap();
//! assert_eq!(outcome.status, RunStatus::Completed);
//! assert_eq!(fsm.current_state().as_str(), "End");
//! # });
//! ```

pub mod builder;
pub mod collection;
pub mod config;
pub mod core;
pub mod effects;
pub mod input;

// Re-export commonly used types
pub use builder::{FsmBuilder, StateBuilder};
pub use collection::{CollectionError, StateCollection, StateDefinition};
pub use config::{ExhaustionPolicy, FsmConfig};
pub use crate::core::{Payload, State, StateId, StateInstance, StateRole};
pub use effects::{Fsm, RunError, RunOutcome, RunStatus, TransitEffect};
pub use input::InputSource;
