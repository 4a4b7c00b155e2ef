//! State registry.
//!
//! Maps state ids to immutable [`StateDescriptor`]s. Mutations never fail
//! loudly: a duplicate registration or an unknown removal is logged and
//! reported through [`StoreStatus`], leaving the registry unchanged.

use log::warn;
use rustc_hash::FxHashMap;

use crate::components::spritestate::StateDescriptor;

/// Outcome of a registry mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    /// The registry was changed.
    Applied,
    /// Registration skipped: the id is already taken.
    Duplicate,
    /// Removal skipped: no state with that id.
    Unknown,
}

/// Registry of animation states keyed by id.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    states: FxHashMap<String, StateDescriptor>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with the launch state.
    pub fn with_launch(launch: StateDescriptor) -> Self {
        let mut store = Self::new();
        store.states.insert(launch.id.clone(), launch);
        store
    }

    /// Insert `state` unless its id is already registered.
    ///
    /// The existing descriptor always wins over the new one.
    pub fn register(&mut self, state: StateDescriptor) -> StoreStatus {
        if self.states.contains_key(&state.id) {
            warn!("Tried to reassign an existing state with ID {}", state.id);
            return StoreStatus::Duplicate;
        }
        self.states.insert(state.id.clone(), state);
        StoreStatus::Applied
    }

    pub fn remove(&mut self, id: &str) -> StoreStatus {
        if self.states.remove(id).is_some() {
            StoreStatus::Applied
        } else {
            warn!("No such state with ID {}", id);
            StoreStatus::Unknown
        }
    }

    pub fn get(&self, id: &str) -> Option<&StateDescriptor> {
        self.states.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.states.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.states.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Registered descriptors, sorted by id.
    pub fn iter(&self) -> impl Iterator<Item = &StateDescriptor> {
        let mut states: Vec<&StateDescriptor> = self.states.values().collect();
        states.sort_unstable_by(|a, b| a.id.cmp(&b.id));
        states.into_iter()
    }
}
