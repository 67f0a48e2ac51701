//! `SQLite` implementation of [`HistoryProvider`], backed by a state log.

use std::collections::HashMap;

use chrono::SecondsFormat;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use mapcard_app::ports::HistoryProvider;
use mapcard_domain::entity::{AttributeValue, EntityState};
use mapcard_domain::error::MapCardError;
use mapcard_domain::history::{EntityHistory, HistoryRequest};
use mapcard_domain::id::EntityId;
use mapcard_domain::time::Timestamp;

use crate::error::RecorderError;

/// Wrapper for converting database rows into domain types without polluting
/// domain structs with database concerns.
struct Wrapper(EntityState);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let entity_id: String = row.try_get("entity_id")?;
        let state: String = row.try_get("state")?;
        let attributes_json: String = row.try_get("attributes")?;
        let last_changed: String = row.try_get("last_changed")?;
        let last_updated: String = row.try_get("last_updated")?;

        let attributes: HashMap<String, AttributeValue> = serde_json::from_str(&attributes_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(EntityState {
            entity_id: EntityId::new(entity_id),
            state,
            attributes,
            last_changed: parse_timestamp(&last_changed)?,
            last_updated: parse_timestamp(&last_updated)?,
        }))
    }
}

fn parse_timestamp(value: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.to_utc())
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

/// Fixed-width RFC 3339 so that text comparison orders timestamps.
fn format_timestamp(value: Timestamp) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

const INSERT: &str = r"
    INSERT INTO states (entity_id, state, attributes, last_changed, last_updated)
    VALUES (?, ?, ?, ?, ?)
";

const SELECT_LATEST: &str = r"
    SELECT s.* FROM states s
    WHERE s.id = (
        SELECT t.id FROM states t
        WHERE t.entity_id = s.entity_id
        ORDER BY t.last_updated DESC, t.id DESC
        LIMIT 1
    )
    ORDER BY s.entity_id ASC
";

const SELECT_INITIAL: &str = r"
    SELECT * FROM states
    WHERE entity_id = ? AND last_updated <= ?
    ORDER BY last_updated DESC, id DESC
    LIMIT 1
";

const SELECT_IN_WINDOW: &str = r"
    SELECT * FROM states
    WHERE entity_id = ? AND last_updated > ? AND last_updated <= ?
    ORDER BY last_updated ASC, id ASC
";

/// `SQLite`-backed state recorder.
#[derive(Debug, Clone)]
pub struct SqliteRecorder {
    pool: SqlitePool,
}

impl SqliteRecorder {
    /// Create a new recorder using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the database at `database_url` and record into it.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError`] if the database cannot be opened or migrated.
    pub async fn connect(database_url: &str) -> Result<Self, RecorderError> {
        crate::pool::connect(database_url).await.map(Self::new)
    }

    /// Append one state to the log.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError`] if serialization or the insert fails.
    pub async fn record(&self, state: &EntityState) -> Result<(), RecorderError> {
        let attributes_json = serde_json::to_string(&state.attributes)?;

        sqlx::query(INSERT)
            .bind(state.entity_id.as_str())
            .bind(&state.state)
            .bind(&attributes_json)
            .bind(format_timestamp(state.last_changed))
            .bind(format_timestamp(state.last_updated))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// The newest recorded state of every entity, ordered by entity id.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError`] if the query fails.
    pub async fn latest_states(&self) -> Result<Vec<EntityState>, RecorderError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_LATEST)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn entity_samples(
        &self,
        entity_id: &EntityId,
        request: &HistoryRequest,
    ) -> Result<Vec<EntityState>, RecorderError> {
        let start = format_timestamp(request.start_time);
        let end = format_timestamp(request.end_time);

        let mut samples = Vec::new();
        if !request.skip_initial_state {
            let initial: Option<Wrapper> = sqlx::query_as(SELECT_INITIAL)
                .bind(entity_id.as_str())
                .bind(&start)
                .fetch_optional(&self.pool)
                .await?;
            if let Some(Wrapper(mut state)) = initial {
                state.last_changed = request.start_time;
                state.last_updated = request.start_time;
                samples.push(state);
            }
        }

        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_IN_WINDOW)
            .bind(entity_id.as_str())
            .bind(&start)
            .bind(&end)
            .fetch_all(&self.pool)
            .await?;
        samples.extend(
            rows.into_iter()
                .map(|w| w.0)
                .filter(|state| {
                    !request.significant_changes_only || state.last_changed == state.last_updated
                }),
        );

        if request.minimal_response {
            for state in samples.iter_mut().skip(1) {
                state.attributes.clear();
            }
        }
        Ok(samples)
    }
}

impl HistoryProvider for SqliteRecorder {
    async fn fetch_recent(
        &self,
        request: &HistoryRequest,
    ) -> Result<Vec<EntityHistory>, MapCardError> {
        let mut histories = Vec::with_capacity(request.entity_ids.len());
        for entity_id in &request.entity_ids {
            let samples = self.entity_samples(entity_id, request).await?;
            if !samples.is_empty() {
                histories.push(EntityHistory::new(samples));
            }
        }
        tracing::debug!(
            entities = %request.entity_ids_csv(),
            found = histories.len(),
            "history fetched"
        );
        Ok(histories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use mapcard_domain::time::now;

    async fn setup() -> SqliteRecorder {
        SqliteRecorder::connect("sqlite::memory:").await.unwrap()
    }

    fn sample(id: &str, latitude: f64, at: Timestamp) -> EntityState {
        EntityState::builder()
            .entity_id(id)
            .state("not_home")
            .location(latitude, 4.0)
            .last_updated(at)
            .build()
    }

    fn request(ids: &[&str], start: Timestamp, end: Timestamp) -> HistoryRequest {
        HistoryRequest::dense(
            ids.iter().copied().map(EntityId::new).collect(),
            start,
            end,
        )
    }

    fn latitudes(history: &EntityHistory) -> Vec<f64> {
        history
            .samples()
            .iter()
            .filter_map(|s| s.location().map(|l| l.latitude))
            .collect()
    }

    #[tokio::test]
    async fn should_return_latest_state_per_entity() {
        let recorder = setup().await;
        let base = now();
        recorder.record(&sample("device_tracker.car", 1.0, base)).await.unwrap();
        recorder
            .record(&sample("device_tracker.car", 2.0, base + Duration::minutes(1)))
            .await
            .unwrap();
        recorder.record(&sample("device_tracker.bike", 5.0, base)).await.unwrap();

        let latest = recorder.latest_states().await.unwrap();

        let ids: Vec<&str> = latest.iter().map(|s| s.entity_id.as_str()).collect();
        assert_eq!(ids, ["device_tracker.bike", "device_tracker.car"]);
        assert_eq!(latest[1].location().map(|l| l.latitude), Some(2.0));
    }

    #[tokio::test]
    async fn should_preserve_attributes_through_roundtrip() {
        let recorder = setup().await;
        let state = EntityState::builder()
            .entity_id("geo_location.quake")
            .attribute("source", AttributeValue::String("usgs".to_string()))
            .attribute("magnitude", AttributeValue::Float(4.5))
            .location(35.5, 139.25)
            .build();
        recorder.record(&state).await.unwrap();

        let latest = recorder.latest_states().await.unwrap();

        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].source(), Some("usgs"));
        assert_eq!(
            latest[0].get_attribute("magnitude"),
            Some(&AttributeValue::Float(4.5))
        );
        // Stored with microsecond precision.
        assert!(state.last_updated - latest[0].last_updated < Duration::microseconds(1));
    }

    #[tokio::test]
    async fn should_include_initial_state_restamped_to_window_start() {
        let recorder = setup().await;
        let end = now();
        let start = end - Duration::hours(1);
        recorder
            .record(&sample("device_tracker.car", 1.0, start - Duration::hours(3)))
            .await
            .unwrap();
        recorder
            .record(&sample("device_tracker.car", 2.0, start - Duration::minutes(5)))
            .await
            .unwrap();
        recorder
            .record(&sample("device_tracker.car", 3.0, start + Duration::minutes(10)))
            .await
            .unwrap();
        recorder
            .record(&sample("device_tracker.car", 4.0, end + Duration::minutes(1)))
            .await
            .unwrap();

        let found = recorder
            .fetch_recent(&request(&["device_tracker.car"], start, end))
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(latitudes(&found[0]), [2.0, 3.0]);
        assert_eq!(found[0].samples()[0].last_updated, start);
    }

    #[tokio::test]
    async fn should_skip_initial_state_when_requested() {
        let recorder = setup().await;
        let end = now();
        let start = end - Duration::hours(1);
        recorder
            .record(&sample("device_tracker.car", 1.0, start - Duration::minutes(5)))
            .await
            .unwrap();
        recorder
            .record(&sample("device_tracker.car", 2.0, start + Duration::minutes(5)))
            .await
            .unwrap();

        let mut request = request(&["device_tracker.car"], start, end);
        request.skip_initial_state = true;
        let found = recorder.fetch_recent(&request).await.unwrap();

        assert_eq!(latitudes(&found[0]), [2.0]);
    }

    #[tokio::test]
    async fn should_group_by_entity_in_request_order_and_omit_empty() {
        let recorder = setup().await;
        let end = now();
        let start = end - Duration::hours(1);
        for (id, lat) in [("device_tracker.car", 1.0), ("device_tracker.bike", 2.0)] {
            recorder
                .record(&sample(id, lat, start + Duration::minutes(1)))
                .await
                .unwrap();
            recorder
                .record(&sample(id, lat + 1.0, start + Duration::minutes(2)))
                .await
                .unwrap();
        }

        let found = recorder
            .fetch_recent(&request(
                &["device_tracker.bike", "device_tracker.gone", "device_tracker.car"],
                start,
                end,
            ))
            .await
            .unwrap();

        let ids: Vec<&str> = found
            .iter()
            .filter_map(|h| h.entity_id().map(EntityId::as_str))
            .collect();
        assert_eq!(ids, ["device_tracker.bike", "device_tracker.car"]);
        assert_eq!(latitudes(&found[0]), [2.0, 3.0]);
    }

    #[tokio::test]
    async fn should_keep_only_significant_changes_when_requested() {
        let recorder = setup().await;
        let end = now();
        let start = end - Duration::hours(1);
        let changed_at = start + Duration::minutes(1);
        recorder
            .record(&sample("device_tracker.car", 1.0, changed_at))
            .await
            .unwrap();
        let attribute_only = EntityState::builder()
            .entity_id("device_tracker.car")
            .location(2.0, 4.0)
            .last_changed(changed_at)
            .last_updated(start + Duration::minutes(2))
            .build();
        recorder.record(&attribute_only).await.unwrap();

        let mut request = request(&["device_tracker.car"], start, end);
        request.significant_changes_only = true;
        let found = recorder.fetch_recent(&request).await.unwrap();

        assert_eq!(latitudes(&found[0]), [1.0]);
    }

    #[tokio::test]
    async fn should_strip_attributes_after_first_sample_for_minimal_response() {
        let recorder = setup().await;
        let end = now();
        let start = end - Duration::hours(1);
        recorder
            .record(&sample("device_tracker.car", 1.0, start + Duration::minutes(1)))
            .await
            .unwrap();
        recorder
            .record(&sample("device_tracker.car", 2.0, start + Duration::minutes(2)))
            .await
            .unwrap();

        let mut request = request(&["device_tracker.car"], start, end);
        request.minimal_response = true;
        let found = recorder.fetch_recent(&request).await.unwrap();

        let samples = found[0].samples();
        assert_eq!(samples.len(), 2);
        assert!(!samples[0].attributes.is_empty());
        assert!(samples[1].attributes.is_empty());
    }
}
