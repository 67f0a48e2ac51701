//! The map card: the facade the host drives.
//!
//! The host feeds inputs through the `set_*` methods, then calls
//! [`MapCard::update`] to run an update cycle. A cycle renders through the
//! [`MapRenderer`] port and may hand back a [`HistoryFetch`] for the host to
//! run; its outcome re-enters through [`MapCard::apply_history`].

use std::sync::Arc;

use serde_json::Value;

use mapcard_domain::aspect_ratio;
use mapcard_domain::config::MapCardConfig;
use mapcard_domain::error::ConfigError;
use mapcard_domain::history::HistoryRecord;
use mapcard_domain::id::EntityId;
use mapcard_domain::map::MapView;
use mapcard_domain::snapshot::HubState;

use crate::change_gate::{ChangeSet, should_update};
use crate::color_cache::ColorCache;
use crate::derive::{EntityResolver, PathDeriver};
use crate::history_scheduler::{FetchOutcome, HistoryFetch, HistoryScheduler, RefreshTrigger};
use crate::ports::{Clock, HistoryProvider, MapRenderer, SystemClock};

/// What an update cycle did.
#[derive(Debug)]
pub struct CycleReport<H> {
    /// Whether a view was handed to the renderer.
    pub rendered: bool,
    /// History fetch started by this cycle, to be run by the host.
    pub fetch: Option<HistoryFetch<H>>,
}

impl<H> CycleReport<H> {
    fn skipped() -> Self {
        Self {
            rendered: false,
            fetch: None,
        }
    }
}

/// A map card instance: configuration, caches and history of one widget.
pub struct MapCard<H, R, C = SystemClock> {
    provider: H,
    renderer: R,
    clock: C,
    config: Option<Arc<MapCardConfig>>,
    explicit_ids: Option<Arc<[EntityId]>>,
    hub: Option<HubState>,
    previous_hub: Option<HubState>,
    panel: bool,
    changes: ChangeSet,
    colors: ColorCache,
    entities: EntityResolver,
    paths: PathDeriver,
    scheduler: HistoryScheduler,
}

impl<H, R> MapCard<H, R>
where
    H: HistoryProvider + Clone,
    R: MapRenderer,
{
    /// Create an unconfigured card reading the system clock.
    pub fn new(provider: H, renderer: R) -> Self {
        Self::with_clock(provider, renderer, SystemClock)
    }
}

impl<H, R, C> MapCard<H, R, C>
where
    H: HistoryProvider + Clone,
    R: MapRenderer,
    C: Clock,
{
    pub fn with_clock(provider: H, renderer: R, clock: C) -> Self {
        Self {
            provider,
            renderer,
            clock,
            config: None,
            explicit_ids: None,
            hub: None,
            previous_hub: None,
            panel: false,
            changes: ChangeSet::default(),
            colors: ColorCache::new(),
            entities: EntityResolver::new(),
            paths: PathDeriver::new(),
            scheduler: HistoryScheduler::default(),
        }
    }

    /// Validate and apply a raw configuration.
    ///
    /// On success the explicit entity list is reset and held history is
    /// pruned to the new tracked set (or discarded when history is disabled).
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] describing the first problem found. The
    /// card keeps its previous configuration in that case.
    #[tracing::instrument(skip_all)]
    pub fn set_config(&mut self, raw: &Value) -> Result<(), ConfigError> {
        let config = MapCardConfig::from_value(raw)
            .inspect_err(|err| tracing::warn!(error = %err, "rejected card configuration"))?;
        let explicit_ids: Arc<[EntityId]> = Arc::from(config.entity_ids());

        if self.scheduler.prune(config.history_hours(), &explicit_ids) {
            self.changes.history = true;
        }
        tracing::info!(
            entities = explicit_ids.len(),
            geo_sources = config.geo_location_sources.is_some(),
            hours_to_show = ?config.history_hours(),
            "card configured"
        );
        self.config = Some(Arc::new(config));
        self.explicit_ids = Some(explicit_ids);
        self.changes.config = true;
        Ok(())
    }

    /// Replace the hub state. Consecutive calls before an update cycle are
    /// compared against the hub seen by the last cycle.
    pub fn set_hub(&mut self, hub: HubState) {
        let previous = self.hub.replace(hub);
        if !self.changes.hub {
            self.previous_hub = previous;
            self.changes.hub = true;
        }
    }

    /// Toggle panel mode, where the card fills the view and has no layout hint.
    pub fn set_panel(&mut self, panel: bool) {
        if self.panel != panel {
            self.panel = panel;
            self.changes.panel = true;
        }
    }

    /// Fold the outcome of a [`HistoryFetch`] into the held history.
    pub fn apply_history(&mut self, outcome: FetchOutcome) {
        let window_hours = self.config.as_ref().and_then(|config| config.history_hours());
        let tracked = self.explicit_ids.as_deref().unwrap_or_default();
        if self.scheduler.apply(outcome, window_hours, tracked) {
            self.changes.history = true;
        }
    }

    /// Run an update cycle over the pending changes.
    ///
    /// Lone hub changes go through the change gate first. A cycle that runs
    /// renders the current view and then performs the refresh check.
    #[tracing::instrument(skip_all)]
    pub fn update(&mut self) -> CycleReport<H> {
        let changes = std::mem::take(&mut self.changes);
        let previous_hub = self.previous_hub.take();
        if changes.is_empty() {
            return CycleReport::skipped();
        }
        if let Some(current) = &self.hub
            && !should_update(&changes, previous_hub.as_ref(), current, self.tracked())
        {
            tracing::trace!("no tracked entity changed, skipping cycle");
            return CycleReport::skipped();
        }
        let Some(view) = self.view() else {
            return CycleReport::skipped();
        };
        self.renderer.render(&view);
        CycleReport {
            rendered: true,
            fetch: self.refresh_check(changes.config),
        }
    }

    fn refresh_check(&mut self, config_applied: bool) -> Option<HistoryFetch<H>> {
        let config = self.config.as_ref()?;
        let trigger = if config_applied {
            RefreshTrigger::ConfigApplied
        } else {
            RefreshTrigger::Tick
        };
        let tracked = self.explicit_ids.as_deref().unwrap_or_default();
        let request =
            self.scheduler
                .poll(trigger, self.clock.now(), config.history_hours(), tracked)?;
        tracing::info!(entities = %request.entity_ids_csv(), "starting history fetch");
        Some(HistoryFetch::new(self.provider.clone(), request))
    }

    /// Build the view handed to the renderer. `None` until configured.
    pub fn view(&mut self) -> Option<MapView> {
        let config = Arc::clone(self.config.as_ref()?);
        let states = self.hub.as_ref().map(|hub| &hub.states);
        let entities = self.entities.resolve(
            &mut self.colors,
            states,
            Some(&config),
            self.explicit_ids.as_ref(),
        );
        let paths = self
            .paths
            .derive(&mut self.colors, &config, self.scheduler.history());
        let host_dark_mode = self.hub.as_ref().is_some_and(|hub| hub.dark_mode);
        Some(MapView {
            title: config.title.clone(),
            entities,
            paths,
            zoom: config.zoom(),
            auto_fit: config.auto_fit,
            dark_mode: config.dark_mode.unwrap_or(host_dark_mode),
        })
    }

    /// Re-center the map on everything it shows.
    pub fn fit_map(&mut self) {
        self.renderer.fit_map();
    }

    /// Layout sizing hint, in grid rows.
    #[must_use]
    pub fn card_size(&self) -> u32 {
        aspect_ratio::card_size(self.aspect_ratio())
    }

    /// CSS `padding-bottom` of the map container; `None` in panel mode or
    /// before configuration.
    #[must_use]
    pub fn layout(&self) -> Option<String> {
        if self.panel || self.config.is_none() {
            return None;
        }
        Some(aspect_ratio::padding_bottom(self.aspect_ratio()))
    }

    fn aspect_ratio(&self) -> Option<&str> {
        self.config
            .as_ref()
            .and_then(|config| config.aspect_ratio.as_deref())
    }

    #[must_use]
    pub fn config(&self) -> Option<&Arc<MapCardConfig>> {
        self.config.as_ref()
    }

    /// Explicitly configured entities; `None` before configuration.
    #[must_use]
    pub fn tracked(&self) -> Option<&[EntityId]> {
        self.explicit_ids.as_deref()
    }

    #[must_use]
    pub fn history(&self) -> Option<&Arc<HistoryRecord>> {
        self.scheduler.history()
    }

    #[must_use]
    pub fn hub(&self) -> Option<&HubState> {
        self.hub.as_ref()
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
