//! Change detection: decides whether an update cycle is worth running.
//!
//! The host pushes a fresh [`HubState`] on every state change anywhere in the
//! system. Most of those changes concern entities the card does not track, so
//! the gate compares only what the card shows.

use std::sync::Arc;

use mapcard_domain::id::EntityId;
use mapcard_domain::snapshot::HubState;

/// Inputs that changed since the last update cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub hub: bool,
    pub config: bool,
    pub history: bool,
    pub panel: bool,
}

impl ChangeSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.hub || self.config || self.history || self.panel)
    }

    /// Whether the hub state is the only pending change.
    #[must_use]
    pub fn only_hub(&self) -> bool {
        self.hub && !(self.config || self.history || self.panel)
    }
}

/// Decide whether the pending `changes` warrant an update cycle.
///
/// Anything other than a lone hub change always updates. For a lone hub
/// change, the cycle runs when:
/// - there is no previous hub, or the tracked list is not established yet;
/// - the theme flag flipped;
/// - any tracked entity's state was replaced.
#[must_use]
pub fn should_update(
    changes: &ChangeSet,
    previous: Option<&HubState>,
    current: &HubState,
    tracked: Option<&[EntityId]>,
) -> bool {
    if !changes.only_hub() {
        return true;
    }
    let (Some(previous), Some(tracked)) = (previous, tracked) else {
        return true;
    };
    if previous.dark_mode != current.dark_mode {
        return true;
    }
    tracked.iter().any(|entity_id| {
        let before = previous.states.get(entity_id.as_str());
        let after = current.states.get(entity_id.as_str());
        match (before, after) {
            (Some(before), Some(after)) => !Arc::ptr_eq(before, after),
            (None, None) => false,
            _ => true,
        }
    })
}
