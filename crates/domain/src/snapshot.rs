//! Global state snapshot: the host's view of every entity at one instant.
//!
//! Snapshots are immutable once built and replaced wholesale by the host.
//! Entities that did not change between two snapshots share the same
//! [`Arc`], so identity comparison is enough to detect a change.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entity::EntityState;
use crate::id::EntityId;

/// Ordered mapping from [`EntityId`] to its current [`EntityState`].
///
/// Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct StateSnapshot {
    states: Vec<Arc<EntityState>>,
    index: HashMap<EntityId, usize>,
}

impl StateSnapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entity's state.
    #[must_use]
    pub fn get(&self, entity_id: &str) -> Option<&Arc<EntityState>> {
        self.index.get(entity_id).map(|&idx| &self.states[idx])
    }

    /// Iterate over all states in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntityState>> {
        self.states.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Insert or replace a state, keeping the original position on replace.
    pub fn insert(&mut self, state: Arc<EntityState>) {
        match self.index.get(&state.entity_id) {
            Some(&idx) => self.states[idx] = state,
            None => {
                self.index.insert(state.entity_id.clone(), self.states.len());
                self.states.push(state);
            }
        }
    }

    /// Return a new snapshot with one state replaced or appended. All other
    /// entities keep their `Arc`.
    #[must_use]
    pub fn with_state(&self, state: EntityState) -> Self {
        let mut next = self.clone();
        next.insert(Arc::new(state));
        next
    }

    /// Build the successor snapshot from a full list of fresh states.
    ///
    /// A fresh state equal to the one already held reuses the existing
    /// `Arc`; entities absent from `fresh` are dropped.
    #[must_use]
    pub fn refreshed(&self, fresh: impl IntoIterator<Item = EntityState>) -> Self {
        fresh
            .into_iter()
            .map(|state| match self.get(state.entity_id.as_str()) {
                Some(current) if **current == state => Arc::clone(current),
                _ => Arc::new(state),
            })
            .collect()
    }
}

impl FromIterator<Arc<EntityState>> for StateSnapshot {
    fn from_iter<T: IntoIterator<Item = Arc<EntityState>>>(iter: T) -> Self {
        let mut snapshot = Self::new();
        for state in iter {
            snapshot.insert(state);
        }
        snapshot
    }
}

impl FromIterator<EntityState> for StateSnapshot {
    fn from_iter<T: IntoIterator<Item = EntityState>>(iter: T) -> Self {
        iter.into_iter().map(Arc::new).collect()
    }
}

/// The host's global object as seen by the card: the state snapshot plus the
/// active theme.
#[derive(Debug, Clone, Default)]
pub struct HubState {
    pub states: Arc<StateSnapshot>,
    pub dark_mode: bool,
}

impl HubState {
    #[must_use]
    pub fn new(states: StateSnapshot) -> Self {
        Self {
            states: Arc::new(states),
            dark_mode: false,
        }
    }

    #[must_use]
    pub fn with_dark_mode(mut self, dark_mode: bool) -> Self {
        self.dark_mode = dark_mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(id: &str, state: &str) -> EntityState {
        EntityState::builder().entity_id(id).state(state).build()
    }

    #[test]
    fn should_iterate_in_insertion_order() {
        let snapshot: StateSnapshot = [
            state("device_tracker.b", "home"),
            state("device_tracker.a", "home"),
            state("sensor.c", "1"),
        ]
        .into_iter()
        .collect();

        let ids: Vec<&str> = snapshot.iter().map(|s| s.entity_id.as_str()).collect();
        assert_eq!(ids, ["device_tracker.b", "device_tracker.a", "sensor.c"]);
    }

    #[test]
    fn should_keep_position_when_replacing_a_state() {
        let snapshot: StateSnapshot = [state("a.one", "x"), state("a.two", "y")]
            .into_iter()
            .collect();
        let next = snapshot.with_state(state("a.one", "z"));

        let ids: Vec<&str> = next.iter().map(|s| s.entity_id.as_str()).collect();
        assert_eq!(ids, ["a.one", "a.two"]);
        assert_eq!(next.get("a.one").unwrap().state, "z");
    }

    #[test]
    fn should_share_unchanged_states_with_previous_snapshot() {
        let snapshot: StateSnapshot = [state("a.one", "x"), state("a.two", "y")]
            .into_iter()
            .collect();
        let next = snapshot.with_state(state("a.one", "z"));

        assert!(Arc::ptr_eq(
            snapshot.get("a.two").unwrap(),
            next.get("a.two").unwrap()
        ));
        assert!(!Arc::ptr_eq(
            snapshot.get("a.one").unwrap(),
            next.get("a.one").unwrap()
        ));
    }

    #[test]
    fn should_reuse_equal_states_when_refreshing() {
        let one = state("a.one", "x");
        let two = state("a.two", "y");
        let snapshot: StateSnapshot = [one.clone(), two.clone()].into_iter().collect();

        let mut moved = two;
        moved.state = "moved".to_string();
        let next = snapshot.refreshed([one, moved]);

        assert!(Arc::ptr_eq(
            snapshot.get("a.one").unwrap(),
            next.get("a.one").unwrap()
        ));
        assert_eq!(next.get("a.two").unwrap().state, "moved");
    }

    #[test]
    fn should_drop_entities_missing_from_refresh() {
        let snapshot: StateSnapshot = [state("a.one", "x"), state("a.two", "y")]
            .into_iter()
            .collect();
        let next = snapshot.refreshed([state("a.two", "y")]);

        assert_eq!(next.len(), 1);
        assert!(next.get("a.one").is_none());
    }
}
