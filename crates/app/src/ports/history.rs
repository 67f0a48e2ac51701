//! History port: bounded retrieval of past entity states.

use std::future::Future;

use mapcard_domain::error::MapCardError;
use mapcard_domain::history::{EntityHistory, HistoryRequest};

/// Retrieves historical states for a set of entities.
pub trait HistoryProvider {
    /// Fetch the samples of every entity in `request` within its time window.
    ///
    /// The result holds one [`EntityHistory`] per entity that has samples, in
    /// request order. Entities without samples are omitted, so an empty
    /// vector is a valid answer.
    fn fetch_recent(
        &self,
        request: &HistoryRequest,
    ) -> impl Future<Output = Result<Vec<EntityHistory>, MapCardError>> + Send;
}

impl<T: HistoryProvider + Send + Sync> HistoryProvider for std::sync::Arc<T> {
    fn fetch_recent(
        &self,
        request: &HistoryRequest,
    ) -> impl Future<Output = Result<Vec<EntityHistory>, MapCardError>> + Send {
        (**self).fetch_recent(request)
    }
}
