//! Builder for constructing engines.

use crate::builder::error::BuildError;
use crate::collection::StateDefinition;
use crate::config::{ExhaustionPolicy, FsmConfig};
use crate::core::{Environment, State};
use crate::effects::{Fsm, TransitionObserver};
use crate::input::InputSource;
use serde_json::Value;
use std::sync::Arc;

/// Builder for constructing engines with a fluent API.
///
/// # Example
///
/// ```rust
/// use stepwise::builder::{FsmBuilder, StateBuilder};
///
/// let fsm = FsmBuilder::<()>::new()
///     .state(StateBuilder::new("Start").initial().on("1", "End").build().unwrap())
///     .state(StateBuilder::new("End").terminal().build().unwrap())
///     .values("value", ["1"])
///     .build()
///     .unwrap();
///
/// assert_eq!(fsm.current_state().as_str(), "Start");
/// ```
pub struct FsmBuilder<Env: Environment = ()> {
    states: Vec<StateDefinition<Env>>,
    inputs: Option<InputSource>,
    config: FsmConfig,
    observers: Vec<Arc<dyn TransitionObserver>>,
}

impl<Env: Environment> FsmBuilder<Env> {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            inputs: None,
            config: FsmConfig::default(),
            observers: Vec::new(),
        }
    }

    /// Add a state definition.
    pub fn state<S>(mut self, state: S) -> Self
    where
        S: State<Env> + 'static,
    {
        self.states.push(Arc::new(state));
        self
    }

    /// Add an already shared state definition.
    pub fn definition(mut self, definition: StateDefinition<Env>) -> Self {
        self.states.push(definition);
        self
    }

    /// Add multiple definitions at once.
    pub fn states(mut self, definitions: impl IntoIterator<Item = StateDefinition<Env>>) -> Self {
        self.states.extend(definitions);
        self
    }

    /// Set the input source (required).
    pub fn inputs(mut self, inputs: impl Into<InputSource>) -> Self {
        self.inputs = Some(inputs.into());
        self
    }

    /// Set the inputs to one `{ field: value }` payload per value.
    pub fn values<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        I::IntoIter: Send + 'static,
        V: Into<Value>,
    {
        self.inputs(InputSource::from_values(field, values))
    }

    pub fn config(mut self, config: FsmConfig) -> Self {
        self.config = config;
        self
    }

    pub fn exhaustion(mut self, policy: ExhaustionPolicy) -> Self {
        self.config.exhaustion = policy;
        self
    }

    /// Register a transition observer.
    pub fn observe(mut self, observer: impl TransitionObserver + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Build the engine.
    /// Returns an error if no inputs were set or the states are invalid.
    pub fn build(self) -> Result<Fsm<Env>, BuildError> {
        let inputs = self.inputs.ok_or(BuildError::MissingInputs)?;

        let mut fsm = Fsm::with_config(self.states, inputs, self.config)?;
        for observer in self.observers {
            fsm.observe_shared(observer);
        }

        Ok(fsm)
    }
}

impl<Env: Environment> Default for FsmBuilder<Env> {
    fn default() -> Self {
        Self::new()
    }
}
