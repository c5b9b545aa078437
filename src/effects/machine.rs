//! The engine that drives a state machine over its inputs.

use crate::collection::{CollectionError, StateCollection, StateDefinition};
use crate::config::{ExhaustionPolicy, FsmConfig};
use crate::core::{Environment, StateHistory, StateId, StateInstance, StateRole, StateTransition};
use crate::effects::transition::{LogTransitions, TransitionError, TransitionObserver};
use crate::input::InputSource;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use stillwater::effect::Effect;
use tracing::{debug, info, warn};

/// Lifecycle of a run.
///
/// `Ready -> Running -> {Completed, Exhausted, Failed}`. A run happens at
/// most once per engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Constructed, no input pulled yet
    Ready,
    /// Inside `run`
    Running,
    /// A terminal state was reached
    Completed,
    /// Inputs ran out before a terminal state was reached
    Exhausted,
    /// The run stopped on an error
    Failed,
}

impl RunStatus {
    /// Whether the run is over, successfully or not.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Exhausted | Self::Failed)
    }
}

/// Summary of a run that returned without error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// `Completed` or `Exhausted`
    pub status: RunStatus,
    /// State the engine stopped in
    pub state: StateId,
    /// Number of inputs consumed
    pub steps: usize,
}

/// Errors that stop a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// A non-terminal state produced no successor, or named a state the
    /// collection does not contain.
    #[error("No next state from '{state}'{}", requested_suffix(.requested))]
    NoNextState {
        state: StateId,
        requested: Option<StateId>,
    },

    #[error("Input exhausted in non-terminal state '{state}'")]
    InputExhausted { state: StateId },

    #[error("Run already started (status: {status:?})")]
    AlreadyStarted { status: RunStatus },

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

fn requested_suffix(requested: &Option<StateId>) -> String {
    match requested {
        Some(id) => format!(": '{id}' is not a known state"),
        None => String::new(),
    }
}

/// What one step of the loop decided.
enum Step {
    Continue,
    Finished(RunStatus),
}

/// Finite state machine engine.
///
/// Owns the validated collection, the single current instance and the input
/// source. Steps run strictly one after another; the only suspension points
/// are the input pull and the transit effect.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use stepwise::builder::StateBuilder;
/// use stepwise::collection::StateDefinition;
/// use stepwise::effects::{Fsm, RunStatus};
/// use stepwise::input::InputSource;
///
/// # futures::executor::block_on(async {
/// let states: Vec<StateDefinition> = vec![
///     Arc::new(StateBuilder::new("Idle").initial().on("coin", "Open").build().unwrap()),
///     Arc::new(StateBuilder::new("Open").terminal().build().unwrap()),
/// ];
///
/// let mut fsm = Fsm::new(states, InputSource::from_values("value", ["coin"])).unwrap();
/// let outcome = fsm.run(&()).await.unwrap();
///
/// assert_eq!(outcome.status, RunStatus::Completed);
/// assert_eq!(fsm.current_state().as_str(), "Open");
/// # });
/// ```
pub struct Fsm<Env: Environment = ()> {
    states: StateCollection<Env>,
    current: StateInstance,
    role: StateRole,
    inputs: InputSource,
    config: FsmConfig,
    observers: Vec<Arc<dyn TransitionObserver>>,
    history: StateHistory,
    status: RunStatus,
}

impl<Env: Environment> Fsm<Env> {
    /// Build an engine with the default configuration.
    ///
    /// Fails if the definitions do not form a valid collection; no engine
    /// exists in that case.
    pub fn new<I>(definitions: I, inputs: impl Into<InputSource>) -> Result<Self, CollectionError>
    where
        I: IntoIterator<Item = StateDefinition<Env>>,
    {
        Self::with_config(definitions, inputs, FsmConfig::default())
    }

    pub fn with_config<I>(
        definitions: I,
        inputs: impl Into<InputSource>,
        config: FsmConfig,
    ) -> Result<Self, CollectionError>
    where
        I: IntoIterator<Item = StateDefinition<Env>>,
    {
        let states = StateCollection::new(definitions)?;
        let current = StateInstance::entered(states.initial().clone());

        let mut observers: Vec<Arc<dyn TransitionObserver>> = Vec::new();
        if config.log_transitions {
            observers.push(Arc::new(LogTransitions));
        }

        Ok(Self {
            states,
            current,
            role: StateRole::Initial,
            inputs: inputs.into(),
            config,
            observers,
            history: StateHistory::new(),
            status: RunStatus::Ready,
        })
    }

    /// Register a hook called after every resolved transition.
    pub fn observe(&mut self, observer: impl TransitionObserver + 'static) {
        self.observers.push(Arc::new(observer));
    }

    pub(crate) fn observe_shared(&mut self, observer: Arc<dyn TransitionObserver>) {
        self.observers.push(observer);
    }

    /// Identifier of the current state.
    pub fn current_state(&self) -> &StateId {
        self.current.state()
    }

    /// The current instance, including the payload it last received.
    pub fn current_instance(&self) -> &StateInstance {
        &self.current
    }

    pub fn current_role(&self) -> StateRole {
        self.role
    }

    pub fn is_terminal(&self) -> bool {
        self.role.is_terminal()
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Number of inputs consumed so far.
    pub fn steps(&self) -> usize {
        self.inputs.pulled()
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    pub fn states(&self) -> &StateCollection<Env> {
        &self.states
    }

    pub fn config(&self) -> &FsmConfig {
        &self.config
    }

    /// Drive the machine until it reaches a terminal state, runs out of
    /// input, or fails.
    ///
    /// May be called once. A second call fails with
    /// [`RunError::AlreadyStarted`] without touching the engine.
    ///
    /// On failure the current instance is left as it was when the error
    /// occurred, payload included, and no further input is pulled.
    pub async fn run(&mut self, env: &Env) -> Result<RunOutcome, RunError> {
        if self.status != RunStatus::Ready {
            return Err(RunError::AlreadyStarted {
                status: self.status,
            });
        }

        self.status = RunStatus::Running;
        info!(
            initial = %self.current.state(),
            states = self.states.len(),
            "fsm run started"
        );

        loop {
            match self.step(env).await {
                Ok(Step::Continue) => {}
                Ok(Step::Finished(status)) => {
                    self.status = status;
                    info!(
                        state = %self.current.state(),
                        steps = self.steps(),
                        ?status,
                        "fsm run finished"
                    );
                    return Ok(RunOutcome {
                        status,
                        state: self.current.state().clone(),
                        steps: self.steps(),
                    });
                }
                Err(error) => {
                    self.status = RunStatus::Failed;
                    warn!(
                        state = %self.current.state(),
                        steps = self.steps(),
                        %error,
                        "fsm run failed"
                    );
                    return Err(error);
                }
            }
        }
    }

    async fn step(&mut self, env: &Env) -> Result<Step, RunError> {
        if self.role.is_terminal() {
            return Ok(Step::Finished(RunStatus::Completed));
        }

        let Some(payload) = self.inputs.next().await else {
            return self.exhausted();
        };

        self.current = StateInstance::new(self.current.state().clone(), payload);
        debug!(
            step = self.steps(),
            state = %self.current.state(),
            payload = ?self.current.payload(),
            "applying input"
        );

        let effect = match self.states.get(self.current.state().as_str()) {
            Some(definition) => definition.transit(&self.current, &self.states),
            None => return Err(self.no_next_state(None)),
        };
        let next = effect.run(env).await?;

        // terminal states never reach transit, so no successor is always an error
        let Some(requested) = next else {
            return Err(self.no_next_state(None));
        };
        match self.states.lookup(requested.as_str()) {
            Some((target, role)) => {
                let target = target.clone();
                self.advance(target, role);
                Ok(Step::Continue)
            }
            None => Err(self.no_next_state(Some(requested))),
        }
    }

    fn advance(&mut self, target: StateId, role: StateRole) {
        let transition = StateTransition {
            from: self.current.state().clone(),
            to: target.clone(),
            timestamp: Utc::now(),
            step: self.steps(),
        };

        for observer in &self.observers {
            observer.on_transition(&transition, self.current.payload());
        }
        if self.config.record_history {
            self.history.push(transition);
        }

        self.role = role;
        self.current = StateInstance::entered(target);
    }

    fn exhausted(&self) -> Result<Step, RunError> {
        match self.config.exhaustion {
            ExhaustionPolicy::Allow => {
                warn!(
                    state = %self.current.state(),
                    role = %self.role,
                    "inputs exhausted before a terminal state"
                );
                Ok(Step::Finished(RunStatus::Exhausted))
            }
            ExhaustionPolicy::Reject => Err(RunError::InputExhausted {
                state: self.current.state().clone(),
            }),
        }
    }

    fn no_next_state(&self, requested: Option<StateId>) -> RunError {
        RunError::NoNextState {
            state: self.current.state().clone(),
            requested,
        }
    }
}

impl<Env: Environment> fmt::Debug for Fsm<Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fsm")
            .field("current", &self.current)
            .field("role", &self.role)
            .field("status", &self.status)
            .field("states", &self.states)
            .field("inputs", &self.inputs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StateBuilder;
    use crate::core::{Payload, State};
    use crate::effects::transition::{goto, no_successor, transit_failed, TransitEffect};
    use std::sync::Mutex;
    use stillwater::prelude::*;

    fn definition(builder: StateBuilder) -> StateDefinition {
        Arc::new(builder.build().unwrap())
    }

    fn two_step_machine() -> Vec<StateDefinition> {
        vec![
            definition(StateBuilder::new("Start").initial().on("go", "Middle")),
            definition(StateBuilder::new("Middle").on("go", "End").on("stay", "Middle")),
            definition(StateBuilder::new("End").terminal()),
        ]
    }

    #[test]
    fn construction_enters_initial_state() {
        let fsm = Fsm::new(two_step_machine(), InputSource::empty()).unwrap();

        assert_eq!(fsm.current_state(), &StateId::new("Start"));
        assert!(fsm.current_instance().payload().is_empty());
        assert_eq!(fsm.current_role(), StateRole::Initial);
        assert_eq!(fsm.status(), RunStatus::Ready);
        assert_eq!(fsm.steps(), 0);
    }

    #[test]
    fn construction_propagates_validation_errors() {
        let result = Fsm::new(
            vec![definition(StateBuilder::new("Start").initial())],
            InputSource::empty(),
        );
        assert!(matches!(result, Err(CollectionError::EndStateNotProvided)));
    }

    #[tokio::test]
    async fn run_reaches_terminal_state() {
        let mut fsm =
            Fsm::new(two_step_machine(), InputSource::from_values("value", ["go", "stay", "go"]))
                .unwrap();

        let outcome = fsm.run(&()).await.unwrap();

        assert_eq!(
            outcome,
            RunOutcome {
                status: RunStatus::Completed,
                state: StateId::new("End"),
                steps: 3,
            }
        );
        assert!(fsm.is_terminal());
        assert_eq!(fsm.status(), RunStatus::Completed);
    }

    #[tokio::test]
    async fn terminal_state_stops_pulling_input() {
        let mut fsm = Fsm::new(
            two_step_machine(),
            InputSource::from_values("value", ["go", "go", "extra", "extra"]),
        )
        .unwrap();

        let outcome = fsm.run(&()).await.unwrap();

        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.steps, 2);
    }

    #[tokio::test]
    async fn unmapped_input_fails_with_no_next_state() {
        let mut fsm =
            Fsm::new(two_step_machine(), InputSource::from_values("value", ["go", "jump", "go"]))
                .unwrap();

        let error = fsm.run(&()).await.unwrap_err();

        match error {
            RunError::NoNextState { state, requested } => {
                assert_eq!(state, StateId::new("Middle"));
                assert!(requested.is_none());
            }
            other => panic!("Expected NoNextState, got {other:?}"),
        }
        assert_eq!(fsm.status(), RunStatus::Failed);
        assert_eq!(fsm.current_state(), &StateId::new("Middle"));
        assert_eq!(fsm.current_instance().payload().get_str("value"), Some("jump"));
        assert_eq!(fsm.steps(), 2);
    }

    #[tokio::test]
    async fn unknown_target_fails_with_no_next_state() {
        let states = vec![
            definition(StateBuilder::new("Start").initial().on("go", "Nowhere")),
            definition(StateBuilder::new("End").terminal()),
        ];
        let mut fsm = Fsm::new(states, InputSource::from_values("value", ["go"])).unwrap();

        let error = fsm.run(&()).await.unwrap_err();

        assert!(matches!(
            error,
            RunError::NoNextState { requested: Some(ref id), .. } if id == "Nowhere"
        ));
        assert_eq!(
            error.to_string(),
            "No next state from 'Start': 'Nowhere' is not a known state"
        );
    }

    #[tokio::test]
    async fn exhaustion_is_allowed_by_default() {
        let mut fsm =
            Fsm::new(two_step_machine(), InputSource::from_values("value", ["go"])).unwrap();

        let outcome = fsm.run(&()).await.unwrap();

        assert_eq!(outcome.status, RunStatus::Exhausted);
        assert_eq!(fsm.current_state(), &StateId::new("Middle"));
        assert!(!fsm.is_terminal());
    }

    #[tokio::test]
    async fn exhaustion_can_be_rejected() {
        let config = FsmConfig::new().exhaustion(ExhaustionPolicy::Reject);
        let mut fsm = Fsm::with_config(
            two_step_machine(),
            InputSource::from_values("value", ["go"]),
            config,
        )
        .unwrap();

        let error = fsm.run(&()).await.unwrap_err();

        assert!(matches!(error, RunError::InputExhausted { ref state } if state == "Middle"));
        assert_eq!(fsm.status(), RunStatus::Failed);
    }

    #[tokio::test]
    async fn second_run_fails_fast() {
        let mut fsm =
            Fsm::new(two_step_machine(), InputSource::from_values("value", ["go", "go"])).unwrap();

        fsm.run(&()).await.unwrap();
        let error = fsm.run(&()).await.unwrap_err();

        assert!(matches!(
            error,
            RunError::AlreadyStarted {
                status: RunStatus::Completed
            }
        ));
        assert_eq!(fsm.status(), RunStatus::Completed);
    }

    #[tokio::test]
    async fn history_records_each_transition() {
        let mut fsm =
            Fsm::new(two_step_machine(), InputSource::from_values("value", ["go", "stay", "go"]))
                .unwrap();

        fsm.run(&()).await.unwrap();

        let path: Vec<&str> = fsm.history().get_path().into_iter().map(StateId::as_str).collect();
        assert_eq!(path, vec!["Start", "Middle", "Middle", "End"]);
        let steps: Vec<usize> = fsm.history().transitions().iter().map(|t| t.step).collect();
        assert_eq!(steps, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn history_can_be_disabled() {
        let config = FsmConfig::new().record_history(false);
        let mut fsm = Fsm::with_config(
            two_step_machine(),
            InputSource::from_values("value", ["go", "go"]),
            config,
        )
        .unwrap();

        fsm.run(&()).await.unwrap();

        assert!(fsm.history().is_empty());
    }

    #[tokio::test]
    async fn observers_see_transitions_with_their_payload() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut fsm =
            Fsm::new(two_step_machine(), InputSource::from_values("value", ["go", "go"])).unwrap();
        fsm.observe(move |transition: &StateTransition, payload: &Payload| {
            sink.lock().unwrap().push(format!(
                "{} -> {} on {}",
                transition.from,
                transition.to,
                payload.get_str("value").unwrap_or("?")
            ));
        });

        fsm.run(&()).await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["Start -> Middle on go", "Middle -> End on go"]
        );
    }

    struct Gate;
    struct Lobby;

    #[derive(Clone)]
    struct Badges {
        valid: Vec<String>,
    }

    impl State<Badges> for Gate {
        fn name(&self) -> &str {
            "Gate"
        }

        fn role(&self) -> StateRole {
            StateRole::Initial
        }

        fn transit(
            &self,
            instance: &StateInstance,
            _states: &StateCollection<Badges>,
        ) -> TransitEffect<Badges> {
            let Some(badge) = instance.payload().get_str("badge").map(String::from) else {
                return transit_failed("no badge presented");
            };
            from_fn(move |env: &Badges| {
                if env.valid.contains(&badge) {
                    Ok(Some(StateId::new("Lobby")))
                } else {
                    Ok(None)
                }
            })
            .boxed()
        }
    }

    impl State<Badges> for Lobby {
        fn name(&self) -> &str {
            "Lobby"
        }

        fn role(&self) -> StateRole {
            StateRole::Terminal
        }

        fn transit(
            &self,
            _instance: &StateInstance,
            _states: &StateCollection<Badges>,
        ) -> TransitEffect<Badges> {
            no_successor()
        }
    }

    fn gate_machine() -> Vec<StateDefinition<Badges>> {
        vec![Arc::new(Gate), Arc::new(Lobby)]
    }

    #[tokio::test]
    async fn transit_effects_run_against_the_environment() {
        let env = Badges {
            valid: vec!["alice".to_string()],
        };

        let mut admitted = Fsm::new(
            gate_machine(),
            InputSource::from_values("badge", ["alice"]),
        )
        .unwrap();
        assert_eq!(admitted.run(&env).await.unwrap().status, RunStatus::Completed);

        let mut refused =
            Fsm::new(gate_machine(), InputSource::from_values("badge", ["mallory"])).unwrap();
        assert!(matches!(
            refused.run(&env).await,
            Err(RunError::NoNextState { .. })
        ));
    }

    #[tokio::test]
    async fn transit_failure_fails_the_run() {
        let env = Badges { valid: Vec::new() };
        let mut fsm = Fsm::new(
            gate_machine(),
            InputSource::from_payloads(vec![Payload::new().with("visitor", "bob")]),
        )
        .unwrap();

        let error = fsm.run(&env).await.unwrap_err();

        assert!(matches!(
            error,
            RunError::Transition(TransitionError::ActionFailed(ref reason)) if reason == "no badge presented"
        ));
        assert_eq!(fsm.status(), RunStatus::Failed);
    }

    struct CountingEnd {
        calls: Arc<Mutex<usize>>,
    }

    impl State for CountingEnd {
        fn name(&self) -> &str {
            "End"
        }

        fn role(&self) -> StateRole {
            StateRole::Terminal
        }

        fn transit(&self, _instance: &StateInstance, _states: &StateCollection) -> TransitEffect {
            *self.calls.lock().unwrap() += 1;
            no_successor()
        }
    }

    #[tokio::test]
    async fn terminal_state_is_never_asked_for_a_successor() {
        let calls = Arc::new(Mutex::new(0));
        let states: Vec<StateDefinition> = vec![
            definition(StateBuilder::new("Start").initial().on("go", "End")),
            Arc::new(CountingEnd {
                calls: Arc::clone(&calls),
            }),
        ];
        let mut fsm =
            Fsm::new(states, InputSource::from_values("value", ["go", "go", "go"])).unwrap();

        let outcome = fsm.run(&()).await.unwrap();

        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.steps, 1);
        assert_eq!(fsm.current_role(), StateRole::Terminal);
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    struct Looping;

    impl State for Looping {
        fn name(&self) -> &str {
            "Loop"
        }

        fn role(&self) -> StateRole {
            StateRole::Initial
        }

        fn transit(&self, _instance: &StateInstance, _states: &StateCollection) -> TransitEffect {
            goto("Loop")
        }
    }

    #[tokio::test]
    async fn self_transition_consumes_every_input() {
        let states: Vec<StateDefinition> = vec![
            Arc::new(Looping),
            definition(StateBuilder::new("End").terminal()),
        ];
        let mut fsm =
            Fsm::new(states, InputSource::from_values("value", ["a", "b", "c"])).unwrap();

        let outcome = fsm.run(&()).await.unwrap();

        assert_eq!(outcome.status, RunStatus::Exhausted);
        assert_eq!(outcome.steps, 3);
        assert_eq!(fsm.history().len(), 3);
    }
}
