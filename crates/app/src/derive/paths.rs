//! Path derivation: turns fetched history into drawable trails.

use std::sync::Arc;

use mapcard_domain::config::MapCardConfig;
use mapcard_domain::history::HistoryRecord;
use mapcard_domain::map::{LatLng, MapPath, PATH_GRADUAL_OPACITY};

use crate::color_cache::ColorCache;
use crate::memo::MemoOne;

type PathKey = (Arc<MapCardConfig>, Option<Arc<HistoryRecord>>);

/// Derives one [`MapPath`] per entity with enough located samples.
#[derive(Debug, Default)]
pub struct PathDeriver {
    memo: MemoOne<PathKey, Option<Arc<Vec<MapPath>>>>,
}

impl PathDeriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` when history is disabled by `config` or nothing has been
    /// fetched yet.
    pub fn derive(
        &mut self,
        colors: &mut ColorCache,
        config: &Arc<MapCardConfig>,
        history: Option<&Arc<HistoryRecord>>,
    ) -> Option<Arc<Vec<MapPath>>> {
        let key = (Arc::clone(config), history.cloned());
        self.memo.get_or_compute(key, |(config, history)| {
            if !config.history_enabled() {
                return None;
            }
            let history = history.as_ref()?;
            Some(Arc::new(derive_paths(colors, history)))
        })
    }
}

fn derive_paths(colors: &mut ColorCache, history: &HistoryRecord) -> Vec<MapPath> {
    let mut paths = Vec::with_capacity(history.len());
    for entity_history in history.iter() {
        if entity_history.len() <= 1 {
            continue;
        }
        let Some(entity_id) = entity_history.entity_id() else {
            continue;
        };
        // Colors are claimed before filtering so the order follows the record.
        let color = colors.color_for(entity_id);
        let points: Vec<LatLng> = entity_history
            .samples()
            .iter()
            .filter_map(|sample| sample.location())
            .collect();
        if points.len() < 2 {
            tracing::trace!(%entity_id, "not enough located samples for a path");
            continue;
        }
        paths.push(MapPath {
            points,
            color,
            gradual_opacity: PATH_GRADUAL_OPACITY,
        });
    }
    paths
}
