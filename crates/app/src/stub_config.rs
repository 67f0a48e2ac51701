//! Starter configuration proposed when a user adds a new map card.

use serde::Serialize;

use mapcard_domain::id::{DEVICE_TRACKER_DOMAIN, EntityId};
use mapcard_domain::snapshot::StateSnapshot;

/// Card type written into generated configurations.
pub const CARD_TYPE: &str = "map";

/// Maximum number of entities a starter configuration lists.
pub const STUB_MAX_ENTITIES: usize = 2;

/// A starter configuration, serializable into the host's card format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StubConfig {
    #[serde(rename = "type")]
    pub card_type: &'static str,
    pub entities: Vec<EntityId>,
}

/// Pick up to `max` entities from `entities`, then from `fallback`, keeping
/// only ids present in `states` whose domain is listed in `domains`
/// (any domain when `domains` is empty).
#[must_use]
pub fn find_entities(
    states: &StateSnapshot,
    max: usize,
    entities: &[EntityId],
    fallback: &[EntityId],
    domains: &[&str],
) -> Vec<EntityId> {
    let eligible = |entity_id: &&EntityId| {
        states.get(entity_id.as_str()).is_some()
            && (domains.is_empty() || domains.iter().any(|domain| *domain == entity_id.domain()))
    };
    let mut found: Vec<EntityId> = entities.iter().filter(eligible).take(max).cloned().collect();
    for entity_id in fallback.iter().filter(eligible) {
        if found.len() >= max {
            break;
        }
        if !found.contains(entity_id) {
            found.push(entity_id.clone());
        }
    }
    found
}

/// Starter configuration listing up to two device trackers.
#[must_use]
pub fn stub_config(
    states: &StateSnapshot,
    entities: &[EntityId],
    fallback: &[EntityId],
) -> StubConfig {
    StubConfig {
        card_type: CARD_TYPE,
        entities: find_entities(
            states,
            STUB_MAX_ENTITIES,
            entities,
            fallback,
            &[DEVICE_TRACKER_DOMAIN],
        ),
    }
}
