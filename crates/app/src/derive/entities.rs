//! Entity set resolution: which entities get a live marker.

use std::sync::Arc;

use mapcard_domain::config::MapCardConfig;
use mapcard_domain::id::{EntityId, GEO_LOCATION_DOMAIN};
use mapcard_domain::map::MapEntity;
use mapcard_domain::snapshot::StateSnapshot;

use crate::color_cache::ColorCache;
use crate::memo::MemoOne;

type ResolveKey = (
    Option<Arc<StateSnapshot>>,
    Option<Arc<MapCardConfig>>,
    Option<Arc<[EntityId]>>,
);

/// Resolves the plotted entity list, recomputing only when one of its inputs
/// is replaced.
#[derive(Debug, Default)]
pub struct EntityResolver {
    memo: MemoOne<ResolveKey, Option<Arc<Vec<MapEntity>>>>,
}

impl EntityResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit entities in configured order, followed by the geo-location
    /// entities matching the source filter in snapshot order.
    ///
    /// Returns `None` while the snapshot or the configuration is missing.
    /// Duplicates are kept.
    pub fn resolve(
        &mut self,
        colors: &mut ColorCache,
        states: Option<&Arc<StateSnapshot>>,
        config: Option<&Arc<MapCardConfig>>,
        explicit: Option<&Arc<[EntityId]>>,
    ) -> Option<Arc<Vec<MapEntity>>> {
        let key = (states.cloned(), config.cloned(), explicit.cloned());
        self.memo.get_or_compute(key, |(states, config, explicit)| {
            let (states, config) = (states.as_ref()?, config.as_ref()?);
            let explicit = explicit.as_deref().unwrap_or_default();
            let resolved = resolve_ids(states, config, explicit)
                .map(|entity_id| MapEntity {
                    color: colors.color_for(&entity_id),
                    entity_id,
                })
                .collect::<Vec<_>>();
            tracing::trace!(count = resolved.len(), "resolved map entities");
            Some(Arc::new(resolved))
        })
    }
}

fn resolve_ids<'a>(
    states: &'a StateSnapshot,
    config: &'a MapCardConfig,
    explicit: &'a [EntityId],
) -> impl Iterator<Item = EntityId> + 'a {
    let dynamic = config
        .geo_location_sources
        .iter()
        .flat_map(move |filter| {
            states
                .iter()
                .filter(move |state| {
                    state.domain() == GEO_LOCATION_DOMAIN && filter.matches(state.source())
                })
                .map(|state| state.entity_id.clone())
        });
    explicit.iter().cloned().chain(dynamic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapcard_domain::entity::{AttributeValue, EntityState};
    use serde_json::json;

    fn geo(id: &str, source: &str) -> EntityState {
        EntityState::builder()
            .entity_id(id)
            .attribute("source", AttributeValue::String(source.to_string()))
            .location(1.0, 2.0)
            .build()
    }

    fn snapshot() -> Arc<StateSnapshot> {
        Arc::new(
            [
                geo("geo_location.quake_a", "usgs"),
                EntityState::builder().entity_id("device_tracker.car").build(),
                geo("geo_location.fire_b", "nsw_fire"),
                geo("sensor.fake_geo", "usgs"),
                geo("geo_location.quake_c", "usgs"),
            ]
            .into_iter()
            .collect(),
        )
    }

    fn config(value: &serde_json::Value) -> Arc<MapCardConfig> {
        Arc::new(MapCardConfig::from_value(value).unwrap())
    }

    fn ids(entities: &[MapEntity]) -> Vec<&str> {
        entities.iter().map(|e| e.entity_id.as_str()).collect()
    }

    #[test]
    fn should_return_none_without_snapshot_or_config() {
        let mut resolver = EntityResolver::new();
        let mut colors = ColorCache::new();
        let config = config(&json!({ "entities": ["device_tracker.car"] }));

        assert!(resolver.resolve(&mut colors, None, Some(&config), None).is_none());
        assert!(
            resolver
                .resolve(&mut colors, Some(&snapshot()), None, None)
                .is_none()
        );
    }

    #[test]
    fn should_keep_configured_order_for_explicit_entities() {
        let mut resolver = EntityResolver::new();
        let mut colors = ColorCache::new();
        let config = config(&json!({ "entities": ["device_tracker.b", "device_tracker.a"] }));
        let explicit: Arc<[EntityId]> = Arc::from(config.entity_ids());

        let resolved = resolver
            .resolve(&mut colors, Some(&snapshot()), Some(&config), Some(&explicit))
            .unwrap();

        assert_eq!(ids(&resolved), ["device_tracker.b", "device_tracker.a"]);
    }

    #[test]
    fn should_match_geo_entities_by_source() {
        let mut resolver = EntityResolver::new();
        let mut colors = ColorCache::new();
        let config = config(&json!({ "geo_location_sources": ["usgs"] }));

        let resolved = resolver
            .resolve(&mut colors, Some(&snapshot()), Some(&config), None)
            .unwrap();

        assert_eq!(
            ids(&resolved),
            ["geo_location.quake_a", "geo_location.quake_c"]
        );
    }

    #[test]
    fn should_match_every_geo_entity_with_all_filter() {
        let mut resolver = EntityResolver::new();
        let mut colors = ColorCache::new();
        let config = config(&json!({ "geo_location_sources": ["all"] }));

        let resolved = resolver
            .resolve(&mut colors, Some(&snapshot()), Some(&config), None)
            .unwrap();

        assert_eq!(
            ids(&resolved),
            [
                "geo_location.quake_a",
                "geo_location.fire_b",
                "geo_location.quake_c"
            ]
        );
    }

    #[test]
    fn should_append_geo_entities_after_explicit_ones_without_dedup() {
        let mut resolver = EntityResolver::new();
        let mut colors = ColorCache::new();
        let config = config(&json!({
            "entities": ["geo_location.quake_c", "device_tracker.car"],
            "geo_location_sources": ["usgs"]
        }));
        let explicit: Arc<[EntityId]> = Arc::from(config.entity_ids());

        let resolved = resolver
            .resolve(&mut colors, Some(&snapshot()), Some(&config), Some(&explicit))
            .unwrap();

        assert_eq!(
            ids(&resolved),
            [
                "geo_location.quake_c",
                "device_tracker.car",
                "geo_location.quake_a",
                "geo_location.quake_c"
            ]
        );
        assert_eq!(resolved[0].color, resolved[3].color);
    }

    #[test]
    fn should_return_same_list_for_identical_inputs() {
        let mut resolver = EntityResolver::new();
        let mut colors = ColorCache::new();
        let states = snapshot();
        let config = config(&json!({ "geo_location_sources": ["all"] }));

        let first = resolver
            .resolve(&mut colors, Some(&states), Some(&config), None)
            .unwrap();
        let second = resolver
            .resolve(&mut colors, Some(&states), Some(&config), None)
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn should_recompute_when_snapshot_is_replaced_by_equal_copy() {
        let mut resolver = EntityResolver::new();
        let mut colors = ColorCache::new();
        let states = snapshot();
        let copy = Arc::new(StateSnapshot::clone(&states));
        let config = config(&json!({ "geo_location_sources": ["all"] }));

        let first = resolver
            .resolve(&mut colors, Some(&states), Some(&config), None)
            .unwrap();
        let second = resolver
            .resolve(&mut colors, Some(&copy), Some(&config), None)
            .unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
    }
}
