//! Validated, read-only index of state definitions.
//!
//! A collection is built once per engine from a caller-supplied list and
//! never changes afterwards. Building it is where the structural rules of a
//! machine are enforced: exactly one initial state, at least one terminal
//! state, unique identifiers.

pub mod error;

pub use error::CollectionError;

use crate::core::{Environment, State, StateId, StateRole};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Shared handle to a state definition.
pub type StateDefinition<Env = ()> = Arc<dyn State<Env>>;

#[derive(Clone)]
struct StateEntry<Env: Environment> {
    definition: StateDefinition<Env>,
    role: StateRole,
}

/// Immutable mapping from identifier to state definition.
///
/// Roles are read from each definition once, here, and cached; nothing asks
/// a definition for its role again.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use stepwise::builder::StateBuilder;
/// use stepwise::collection::{CollectionError, StateCollection, StateDefinition};
///
/// let start = StateBuilder::new("Start").initial().on("go", "End").build().unwrap();
/// let end = StateBuilder::new("End").terminal().build().unwrap();
///
/// let definitions: Vec<StateDefinition> = vec![Arc::new(start), Arc::new(end)];
/// let states = StateCollection::new(definitions).unwrap();
///
/// assert_eq!(states.initial().as_str(), "Start");
/// assert!(states.get("End").is_some());
/// assert!(states.get("Elsewhere").is_none());
///
/// let no_end: Vec<StateDefinition> =
///     vec![Arc::new(StateBuilder::new("Start").initial().build().unwrap())];
/// assert_eq!(
///     StateCollection::new(no_end).unwrap_err(),
///     CollectionError::EndStateNotProvided
/// );
/// ```
#[derive(Clone)]
pub struct StateCollection<Env: Environment = ()> {
    entries: HashMap<StateId, StateEntry<Env>>,
    order: Vec<StateId>,
    initial: StateId,
}

impl<Env: Environment> StateCollection<Env> {
    /// Validate and index `definitions`.
    ///
    /// Checks run in a fixed order, so a list with several problems always
    /// reports the same one:
    /// 1. no initial state
    /// 2. more than one initial state (counted over the list, so the same
    ///    definition given twice counts twice)
    /// 3. no terminal state
    /// 4. duplicate identifiers
    pub fn new<I>(definitions: I) -> Result<Self, CollectionError>
    where
        I: IntoIterator<Item = StateDefinition<Env>>,
    {
        let entries: Vec<(StateId, StateEntry<Env>)> = definitions
            .into_iter()
            .map(|definition| {
                let role = definition.role();
                (definition.id(), StateEntry { definition, role })
            })
            .collect();

        let initial_states: Vec<StateId> = entries
            .iter()
            .filter(|(_, entry)| entry.role.is_initial())
            .map(|(id, _)| id.clone())
            .collect();

        let initial = match initial_states.as_slice() {
            [] => return Err(CollectionError::InitialStateNotProvided),
            [only] => only.clone(),
            _ => {
                return Err(CollectionError::MultipleInitialStatesProvided {
                    states: initial_states,
                })
            }
        };

        if !entries.iter().any(|(_, entry)| entry.role.is_terminal()) {
            return Err(CollectionError::EndStateNotProvided);
        }

        let mut order = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());
        for (id, entry) in entries {
            if index.contains_key(&id) {
                return Err(CollectionError::DuplicateState { name: id });
            }
            order.push(id.clone());
            index.insert(id, entry);
        }

        debug!(states = order.len(), %initial, "state collection validated");

        Ok(Self {
            entries: index,
            order,
            initial,
        })
    }

    /// Look up a definition. Absence is a normal answer, not an error.
    pub fn get(&self, id: &str) -> Option<&StateDefinition<Env>> {
        self.entries.get(id).map(|entry| &entry.definition)
    }

    /// Cached role of the state named `id`.
    pub fn role(&self, id: &str) -> Option<StateRole> {
        self.entries.get(id).map(|entry| entry.role)
    }

    /// Canonical identifier for `id`, if the collection knows it.
    pub fn resolve(&self, id: &str) -> Option<&StateId> {
        self.entries.get_key_value(id).map(|(key, _)| key)
    }

    /// Canonical identifier and cached role for `id`, in one lookup.
    pub fn lookup(&self, id: &str) -> Option<(&StateId, StateRole)> {
        self.entries
            .get_key_value(id)
            .map(|(key, entry)| (key, entry.role))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// The unique initial state.
    pub fn initial(&self) -> &StateId {
        &self.initial
    }

    /// Terminal states, in registration order.
    pub fn terminals(&self) -> impl Iterator<Item = &StateId> + '_ {
        self.order
            .iter()
            .filter(move |id| self.role(id.as_str()) == Some(StateRole::Terminal))
    }

    /// All identifiers, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &StateId> + '_ {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<Env: Environment> fmt::Debug for StateCollection<Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.order
                    .iter()
                    .map(|id| (id.as_str(), self.entries[id.as_str()].role)),
            )
            .finish()
    }
}
