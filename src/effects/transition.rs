//! Transit effects and transition observers.

use crate::core::{Environment, Payload, StateId, StateTransition};
use stillwater::effect::BoxedEffect;
use stillwater::prelude::*;
use tracing::info;

/// Effect returned by [`State::transit`](crate::core::State::transit).
///
/// Resolves to the identifier of the next state, or `None` for "no
/// successor". Runs against the engine's environment, so a state can do
/// I/O while deciding.
pub type TransitEffect<Env = ()> = BoxedEffect<Option<StateId>, TransitionError, Env>;

/// Errors a transit effect can report.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransitionError {
    #[error("Transition action failed: {0}")]
    ActionFailed(String),
}

/// Transit effect that moves to `target`.
pub fn goto<Env: Environment>(target: impl Into<StateId>) -> TransitEffect<Env> {
    pure(Some(target.into())).boxed()
}

/// Transit effect with no successor.
///
/// Expected from terminal states; from any other state it fails the run.
pub fn no_successor<Env: Environment>() -> TransitEffect<Env> {
    pure(None).boxed()
}

/// Transit effect that fails the run with [`TransitionError::ActionFailed`].
pub fn transit_failed<Env: Environment>(reason: impl Into<String>) -> TransitEffect<Env> {
    fail(TransitionError::ActionFailed(reason.into())).boxed()
}

/// Hook invoked by the engine after every resolved transition.
///
/// Observers see the transition record and the payload that caused it.
/// They cannot change the outcome of a step. Closures of the right shape
/// are observers too.
pub trait TransitionObserver: Send + Sync {
    fn on_transition(&self, transition: &StateTransition, payload: &Payload);
}

impl<F> TransitionObserver for F
where
    F: Fn(&StateTransition, &Payload) + Send + Sync,
{
    fn on_transition(&self, transition: &StateTransition, payload: &Payload) {
        self(transition, payload)
    }
}

/// Observer that logs each successful transition as `from -> to`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogTransitions;

impl TransitionObserver for LogTransitions {
    fn on_transition(&self, transition: &StateTransition, _payload: &Payload) {
        info!(
            from = %transition.from,
            to = %transition.to,
            step = transition.step,
            "{} -> {}",
            transition.from,
            transition.to
        );
    }
}
