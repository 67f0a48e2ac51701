//! Entity history: time-ordered state samples fetched for the map trails.

use serde::{Deserialize, Serialize};

use crate::entity::EntityState;
use crate::id::EntityId;
use crate::time::Timestamp;

/// Time-ordered state samples of a single entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityHistory(Vec<EntityState>);

impl EntityHistory {
    #[must_use]
    pub fn new(samples: Vec<EntityState>) -> Self {
        Self(samples)
    }

    /// The entity the samples belong to, taken from the first sample.
    #[must_use]
    pub fn entity_id(&self) -> Option<&EntityId> {
        self.0.first().map(|sample| &sample.entity_id)
    }

    #[must_use]
    pub fn samples(&self) -> &[EntityState] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<EntityState>> for EntityHistory {
    fn from(samples: Vec<EntityState>) -> Self {
        Self(samples)
    }
}

/// The history currently held by the card: one [`EntityHistory`] per entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryRecord(Vec<EntityHistory>);

impl HistoryRecord {
    #[must_use]
    pub fn new(entities: Vec<EntityHistory>) -> Self {
        Self(entities)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityHistory> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// History of a single entity, if held.
    #[must_use]
    pub fn get(&self, entity_id: &str) -> Option<&EntityHistory> {
        self.0
            .iter()
            .find(|history| history.entity_id().is_some_and(|id| id.as_str() == entity_id))
    }

    /// Copy of this record keeping only entities listed in `tracked`.
    ///
    /// Empty sequences carry no entity id and are dropped as well.
    #[must_use]
    pub fn retain_tracked(&self, tracked: &[EntityId]) -> Self {
        Self(
            self.0
                .iter()
                .filter(|history| history.entity_id().is_some_and(|id| tracked.contains(id)))
                .cloned()
                .collect(),
        )
    }

    /// Whether every held entity is listed in `tracked`.
    #[must_use]
    pub fn only_tracks(&self, tracked: &[EntityId]) -> bool {
        self.0
            .iter()
            .all(|history| history.entity_id().is_some_and(|id| tracked.contains(id)))
    }
}

impl FromIterator<EntityHistory> for HistoryRecord {
    fn from_iter<T: IntoIterator<Item = EntityHistory>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A bounded history query for several entities at once.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRequest {
    pub entity_ids: Vec<EntityId>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Omit the state in effect at `start_time`.
    pub skip_initial_state: bool,
    /// Only return samples where the state value itself changed.
    pub significant_changes_only: bool,
    /// Strip attributes from all but the first sample of each entity.
    pub minimal_response: bool,
}

impl HistoryRequest {
    /// Request the full, dense record: initial state included, every sample,
    /// every attribute.
    #[must_use]
    pub fn dense(entity_ids: Vec<EntityId>, start_time: Timestamp, end_time: Timestamp) -> Self {
        Self {
            entity_ids,
            start_time,
            end_time,
            skip_initial_state: false,
            significant_changes_only: false,
            minimal_response: false,
        }
    }

    /// Entity ids joined with `,`, as expected by history endpoints.
    #[must_use]
    pub fn entity_ids_csv(&self) -> String {
        self.entity_ids
            .iter()
            .map(EntityId::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    fn samples(id: &str, count: usize) -> EntityHistory {
        (0..count)
            .map(|_| EntityState::builder().entity_id(id).build())
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn should_take_entity_id_from_first_sample() {
        assert_eq!(
            samples("device_tracker.car", 2).entity_id(),
            Some(&EntityId::new("device_tracker.car"))
        );
        assert_eq!(EntityHistory::default().entity_id(), None);
    }

    #[test]
    fn should_retain_only_tracked_entities() {
        let record: HistoryRecord = [
            samples("device_tracker.a", 2),
            samples("device_tracker.b", 3),
            EntityHistory::default(),
        ]
        .into_iter()
        .collect();

        let pruned = record.retain_tracked(&[EntityId::new("device_tracker.b")]);

        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned.get("device_tracker.b").map(EntityHistory::len), Some(3));
        assert!(pruned.get("device_tracker.a").is_none());
    }

    #[test]
    fn should_report_whether_record_only_tracks_given_entities() {
        let record: HistoryRecord = [samples("a.one", 2), samples("a.two", 2)]
            .into_iter()
            .collect();
        assert!(record.only_tracks(&[EntityId::new("a.one"), EntityId::new("a.two")]));
        assert!(!record.only_tracks(&[EntityId::new("a.one")]));
    }

    #[test]
    fn should_build_dense_request_with_all_flags_disabled() {
        let end = now();
        let request = HistoryRequest::dense(
            vec![EntityId::new("device_tracker.a"), EntityId::new("device_tracker.b")],
            end - chrono::Duration::hours(1),
            end,
        );
        assert!(!request.skip_initial_state);
        assert!(!request.significant_changes_only);
        assert!(!request.minimal_response);
        assert_eq!(request.entity_ids_csv(), "device_tracker.a,device_tracker.b");
    }
}
