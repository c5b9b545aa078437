//! Table-driven states and their builder.

use crate::builder::error::BuildError;
use crate::collection::StateCollection;
use crate::core::{Environment, Guard, Payload, State, StateId, StateInstance, StateRole};
use crate::effects::{goto, no_successor, TransitEffect};
use serde_json::Value;
use std::fmt;

/// Payload field matched by [`StateBuilder::on`] unless another is chosen.
pub const DEFAULT_KEY_FIELD: &str = "value";

/// One guarded edge out of a table-driven state.
#[derive(Debug)]
pub struct TransitionRule {
    guard: Guard<Payload>,
    target: StateId,
}

impl TransitionRule {
    pub fn new(guard: Guard<Payload>, target: StateId) -> Self {
        Self { guard, target }
    }

    pub fn matches(&self, payload: &Payload) -> bool {
        self.guard.check(payload)
    }

    pub fn target(&self) -> &StateId {
        &self.target
    }
}

/// A state whose successor is looked up in an ordered table of rules.
///
/// The first rule whose guard holds for the step's payload names the next
/// state; when none holds there is no successor. The target is handed to the
/// engine as is, so a target missing from the collection surfaces as a
/// `NoNextState` error naming it.
pub struct TableState {
    name: StateId,
    role: StateRole,
    rules: Vec<TransitionRule>,
}

impl TableState {
    /// Target chosen for `payload`, if any rule holds.
    pub fn next_for(&self, payload: &Payload) -> Option<&StateId> {
        self.rules
            .iter()
            .find(|rule| rule.matches(payload))
            .map(TransitionRule::target)
    }

    pub fn rules(&self) -> &[TransitionRule] {
        &self.rules
    }
}

impl<Env: Environment> State<Env> for TableState {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn role(&self) -> StateRole {
        self.role
    }

    fn transit(&self, instance: &StateInstance, _states: &StateCollection<Env>) -> TransitEffect<Env> {
        match self.next_for(instance.payload()) {
            Some(target) => goto(target.clone()),
            None => no_successor(),
        }
    }
}

impl fmt::Debug for TableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableState")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("rules", &self.rules.len())
            .finish()
    }
}

enum PendingRule {
    Equals(Value, StateId),
    Guarded(Guard<Payload>, StateId),
}

/// Builder for table-driven states with a fluent API.
///
/// # Example
///
/// ```rust
/// use stepwise::builder::StateBuilder;
/// use stepwise::core::Payload;
///
/// let s1 = StateBuilder::new("S1")
///     .on("3", "S3")
///     .on("2", "S2")
///     .build()
///     .unwrap();
///
/// let next = s1.next_for(&Payload::new().with("value", "2"));
/// assert_eq!(next.map(|id| id.as_str()), Some("S2"));
/// assert!(s1.next_for(&Payload::new().with("value", "9")).is_none());
/// ```
pub struct StateBuilder {
    name: String,
    role: StateRole,
    key_field: String,
    rules: Vec<PendingRule>,
}

impl StateBuilder {
    /// Start a `Standard` state named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: StateRole::Standard,
            key_field: DEFAULT_KEY_FIELD.to_string(),
            rules: Vec::new(),
        }
    }

    pub fn role(mut self, role: StateRole) -> Self {
        self.role = role;
        self
    }

    pub fn initial(self) -> Self {
        self.role(StateRole::Initial)
    }

    pub fn terminal(self) -> Self {
        self.role(StateRole::Terminal)
    }

    /// Payload field compared by [`on`](Self::on) rules. Applies to all of
    /// them, whenever it is called.
    pub fn key_field(mut self, field: impl Into<String>) -> Self {
        self.key_field = field.into();
        self
    }

    /// Move to `target` when the key field equals `value`.
    pub fn on(mut self, value: impl Into<Value>, target: impl Into<StateId>) -> Self {
        self.rules.push(PendingRule::Equals(value.into(), target.into()));
        self
    }

    /// Move to `target` when `predicate` holds for the payload.
    pub fn when<F>(mut self, predicate: F, target: impl Into<StateId>) -> Self
    where
        F: Fn(&Payload) -> bool + Send + Sync + 'static,
    {
        self.rules
            .push(PendingRule::Guarded(Guard::new(predicate), target.into()));
        self
    }

    /// Move to `target` when `guard` holds.
    pub fn guard(mut self, guard: Guard<Payload>, target: impl Into<StateId>) -> Self {
        self.rules.push(PendingRule::Guarded(guard, target.into()));
        self
    }

    /// Build the state.
    /// Returns an error if the name, key field or a target is empty, or if
    /// a terminal state was given rules.
    pub fn build(self) -> Result<TableState, BuildError> {
        if self.name.is_empty() {
            return Err(BuildError::EmptyName);
        }
        let name = StateId::new(self.name);

        if self.role.is_terminal() && !self.rules.is_empty() {
            return Err(BuildError::TerminalWithRules { state: name });
        }

        let uses_key = self
            .rules
            .iter()
            .any(|rule| matches!(rule, PendingRule::Equals(..)));
        if uses_key && self.key_field.is_empty() {
            return Err(BuildError::EmptyKeyField);
        }

        let mut rules = Vec::with_capacity(self.rules.len());
        for pending in self.rules {
            let (guard, target) = match pending {
                PendingRule::Equals(value, target) => {
                    (Guard::field_equals(self.key_field.clone(), value), target)
                }
                PendingRule::Guarded(guard, target) => (guard, target),
            };
            if target.as_str().is_empty() {
                return Err(BuildError::EmptyTarget { state: name });
            }
            rules.push(TransitionRule::new(guard, target));
        }

        Ok(TableState {
            name,
            role: self.role,
            rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::StateDefinition;
    use std::sync::Arc;
    use stillwater::effect::Effect;

    fn payload(value: &str) -> Payload {
        Payload::new().with(DEFAULT_KEY_FIELD, value)
    }

    #[test]
    fn builder_defaults_to_standard_role() {
        let state = StateBuilder::new("S1").build().unwrap();
        assert_eq!(State::<()>::role(&state), StateRole::Standard);
        assert_eq!(State::<()>::name(&state), "S1");
    }

    #[test]
    fn first_matching_rule_wins() {
        let state = StateBuilder::new("S3")
            .when(|p| p.get_str("value").is_some(), "Any")
            .on("3", "S3")
            .build()
            .unwrap();

        assert_eq!(state.next_for(&payload("3")), Some(&StateId::new("Any")));
    }

    #[test]
    fn unmatched_payload_has_no_successor() {
        let state = StateBuilder::new("S2").on("4", "End").build().unwrap();

        assert!(state.next_for(&payload("1")).is_none());
        assert!(state.next_for(&Payload::new()).is_none());
    }

    #[test]
    fn key_field_applies_to_every_on_rule() {
        let state = StateBuilder::new("Door")
            .on("push", "Open")
            .key_field("action")
            .build()
            .unwrap();

        assert!(state.next_for(&payload("push")).is_none());
        assert_eq!(
            state.next_for(&Payload::new().with("action", "push")),
            Some(&StateId::new("Open"))
        );
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(matches!(
            StateBuilder::new("").build(),
            Err(BuildError::EmptyName)
        ));
    }

    #[test]
    fn empty_key_field_is_rejected_when_used() {
        let result = StateBuilder::new("S1").key_field("").on("1", "S2").build();
        assert!(matches!(result, Err(BuildError::EmptyKeyField)));

        assert!(StateBuilder::new("S1")
            .key_field("")
            .when(|_| true, "S2")
            .build()
            .is_ok());
    }

    #[test]
    fn empty_target_is_rejected() {
        let result = StateBuilder::new("S1").on("1", "").build();
        assert!(matches!(result, Err(BuildError::EmptyTarget { .. })));
    }

    #[test]
    fn terminal_with_rules_is_rejected() {
        let result = StateBuilder::new("End").terminal().on("1", "Start").build();
        assert!(matches!(
            result,
            Err(BuildError::TerminalWithRules { ref state }) if state == "End"
        ));
    }

    #[test]
    fn guard_rules_accept_prebuilt_guards() {
        let state = StateBuilder::new("Gate")
            .guard(Guard::field_present("badge"), "Lobby")
            .build()
            .unwrap();

        assert_eq!(
            state.next_for(&Payload::new().with("badge", "x")),
            Some(&StateId::new("Lobby"))
        );
        assert_eq!(state.rules().len(), 1);
    }

    #[tokio::test]
    async fn transit_is_idempotent() {
        let start: StateDefinition = Arc::new(
            StateBuilder::new("Start")
                .initial()
                .on("1", "End")
                .build()
                .unwrap(),
        );
        let end: StateDefinition = Arc::new(StateBuilder::new("End").terminal().build().unwrap());
        let states = StateCollection::new(vec![Arc::clone(&start), end]).unwrap();

        let instance = StateInstance::new(StateId::new("Start"), payload("1"));
        let first = start.transit(&instance, &states).run(&()).await.unwrap();
        let second = start.transit(&instance, &states).run(&()).await.unwrap();

        assert_eq!(first, Some(StateId::new("End")));
        assert_eq!(first, second);
    }
}
