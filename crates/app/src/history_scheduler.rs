//! History refresh scheduling.
//!
//! The scheduler owns the fetched [`HistoryRecord`] and the refresh clock.
//! It never performs IO itself: [`HistoryScheduler::poll`] hands out a
//! [`HistoryRequest`] when a fetch is due, the host runs it (usually through
//! [`HistoryFetch`]) and the outcome comes back through
//! [`HistoryScheduler::apply`].

use std::sync::Arc;
use std::time::Duration;

use mapcard_domain::error::MapCardError;
use mapcard_domain::history::{EntityHistory, HistoryRecord, HistoryRequest};
use mapcard_domain::id::EntityId;
use mapcard_domain::time::{Timestamp, hours_before};

use crate::ports::HistoryProvider;

/// Minimum delay between two cadence-triggered fetches.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Why the refresh check runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// A new configuration was applied: fetch regardless of the cooldown.
    ConfigApplied,
    /// Any other update cycle: fetch once the cooldown has elapsed.
    Tick,
}

/// Result of a finished fetch, ready to be handed back to the card.
#[derive(Debug)]
pub struct FetchOutcome {
    pub request: HistoryRequest,
    pub result: Result<Vec<EntityHistory>, MapCardError>,
}

/// A history fetch started by the card. Fire-and-forget: nothing cancels it.
#[derive(Debug)]
pub struct HistoryFetch<H> {
    provider: H,
    request: HistoryRequest,
}

impl<H: HistoryProvider> HistoryFetch<H> {
    #[must_use]
    pub fn new(provider: H, request: HistoryRequest) -> Self {
        Self { provider, request }
    }

    #[must_use]
    pub fn request(&self) -> &HistoryRequest {
        &self.request
    }

    /// Run the fetch against the provider.
    pub async fn run(self) -> FetchOutcome {
        let result = self.provider.fetch_recent(&self.request).await;
        FetchOutcome {
            request: self.request,
            result,
        }
    }
}

/// Refresh clock and fetched history of one card.
#[derive(Debug)]
pub struct HistoryScheduler {
    interval: Duration,
    last_fetch: Option<Timestamp>,
    history: Option<Arc<HistoryRecord>>,
}

impl Default for HistoryScheduler {
    fn default() -> Self {
        Self::new(REFRESH_INTERVAL)
    }
}

impl HistoryScheduler {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fetch: None,
            history: None,
        }
    }

    /// The currently held history, if any.
    #[must_use]
    pub fn history(&self) -> Option<&Arc<HistoryRecord>> {
        self.history.as_ref()
    }

    /// When the last fetch was started.
    #[must_use]
    pub fn last_fetch(&self) -> Option<Timestamp> {
        self.last_fetch
    }

    /// Refresh check run at the end of an update cycle.
    ///
    /// Returns the request to send when a fetch is due. Nothing is due while
    /// `window_hours` is `None` or `tracked` is empty. The refresh clock is
    /// stamped here, at fetch start, so a slow fetch cannot cause another one.
    #[tracing::instrument(skip(self, tracked), fields(tracked_count = tracked.len()))]
    pub fn poll(
        &mut self,
        trigger: RefreshTrigger,
        now: Timestamp,
        window_hours: Option<f64>,
        tracked: &[EntityId],
    ) -> Option<HistoryRequest> {
        let hours = window_hours?;
        if tracked.is_empty() {
            return None;
        }
        let due = match trigger {
            RefreshTrigger::ConfigApplied => true,
            RefreshTrigger::Tick => self.last_fetch.is_none_or(|last| {
                (now - last)
                    .to_std()
                    .is_ok_and(|elapsed| elapsed >= self.interval)
            }),
        };
        if !due {
            return None;
        }
        self.last_fetch = Some(now);
        tracing::debug!(hours, "history fetch due");
        Some(HistoryRequest::dense(
            tracked.to_vec(),
            hours_before(now, hours),
            now,
        ))
    }

    /// Fold a finished fetch into the held history.
    ///
    /// A non-empty response replaces the history wholesale, restricted to
    /// the entities still tracked. Failures and empty responses keep the
    /// previous history; the next due tick retries. Responses arriving after
    /// history was disabled are dropped. Returns whether the history changed.
    #[tracing::instrument(skip_all, fields(entities = %outcome.request.entity_ids_csv()))]
    pub fn apply(
        &mut self,
        outcome: FetchOutcome,
        window_hours: Option<f64>,
        tracked: &[EntityId],
    ) -> bool {
        let entities = match outcome.result {
            Ok(entities) => entities,
            Err(err) => {
                tracing::warn!(error = %err, "history fetch failed, keeping previous history");
                return false;
            }
        };
        if window_hours.is_none() {
            tracing::debug!("history disabled since the fetch started, dropping response");
            return false;
        }
        let record = HistoryRecord::new(entities).retain_tracked(tracked);
        if record.is_empty() {
            tracing::debug!("empty history response, keeping previous history");
            return false;
        }
        tracing::debug!(count = record.len(), "history replaced");
        self.history = Some(Arc::new(record));
        true
    }

    /// Reconcile held history with a new configuration: drop every record
    /// of an untracked entity, or everything when history is disabled.
    /// Returns whether the history changed.
    pub fn prune(&mut self, window_hours: Option<f64>, tracked: &[EntityId]) -> bool {
        let Some(history) = &self.history else {
            return false;
        };
        if window_hours.is_none() {
            tracing::debug!("history disabled, discarding held history");
            self.history = None;
            return true;
        }
        if history.only_tracks(tracked) {
            return false;
        }
        let pruned = history.retain_tracked(tracked);
        tracing::debug!(
            before = history.len(),
            after = pruned.len(),
            "pruned untracked history"
        );
        self.history = Some(Arc::new(pruned));
        true
    }
}
