//! Entity state: the observed state of one entity at one point in time.
//!
//! The same type is used for the live snapshot and for history samples.

mod attribute_value;

pub use attribute_value::AttributeValue;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::id::EntityId;
use crate::map::LatLng;
use crate::time::Timestamp;

/// Attribute key holding the latitude in decimal degrees.
pub const ATTR_LATITUDE: &str = "latitude";
/// Attribute key holding the longitude in decimal degrees.
pub const ATTR_LONGITUDE: &str = "longitude";
/// Attribute key naming the platform that produced a geo-location entity.
pub const ATTR_SOURCE: &str = "source";

/// Observed state of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub entity_id: EntityId,
    pub state: String,
    #[serde(default)]
    pub attributes: HashMap<String, AttributeValue>,
    pub last_changed: Timestamp,
    pub last_updated: Timestamp,
}

impl EntityState {
    /// Create a builder for constructing an [`EntityState`].
    #[must_use]
    pub fn builder() -> EntityStateBuilder {
        EntityStateBuilder::default()
    }

    /// Domain of the entity, derived from its id.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.entity_id.domain()
    }

    /// Look up an attribute by key.
    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// The `source` attribute, when it is a string.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.get_attribute(ATTR_SOURCE)
            .and_then(AttributeValue::as_str)
    }

    /// Position of the entity.
    ///
    /// Returns `None` unless both coordinates are present, truthy and numeric:
    /// a `0` or `null` coordinate counts as missing.
    #[must_use]
    pub fn location(&self) -> Option<LatLng> {
        let latitude = self.coordinate(ATTR_LATITUDE)?;
        let longitude = self.coordinate(ATTR_LONGITUDE)?;
        Some(LatLng::new(latitude, longitude))
    }

    fn coordinate(&self, key: &str) -> Option<f64> {
        self.get_attribute(key)
            .filter(|value| value.is_truthy())
            .and_then(AttributeValue::as_f64)
    }
}

/// Step-by-step builder for [`EntityState`].
#[derive(Debug, Default)]
pub struct EntityStateBuilder {
    entity_id: Option<EntityId>,
    state: Option<String>,
    attributes: HashMap<String, AttributeValue>,
    last_changed: Option<Timestamp>,
    last_updated: Option<Timestamp>,
}

impl EntityStateBuilder {
    #[must_use]
    pub fn entity_id(mut self, entity_id: impl Into<EntityId>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Shorthand for setting both coordinate attributes.
    #[must_use]
    pub fn location(self, latitude: f64, longitude: f64) -> Self {
        self.attribute(ATTR_LATITUDE, AttributeValue::Float(latitude))
            .attribute(ATTR_LONGITUDE, AttributeValue::Float(longitude))
    }

    #[must_use]
    pub fn last_changed(mut self, last_changed: Timestamp) -> Self {
        self.last_changed = Some(last_changed);
        self
    }

    #[must_use]
    pub fn last_updated(mut self, last_updated: Timestamp) -> Self {
        self.last_updated = Some(last_updated);
        self
    }

    /// Consume the builder and return an [`EntityState`].
    ///
    /// Missing timestamps default to now; a missing `last_changed` follows
    /// `last_updated`.
    #[must_use]
    pub fn build(self) -> EntityState {
        let last_updated = self.last_updated.unwrap_or_else(crate::time::now);
        EntityState {
            entity_id: self.entity_id.unwrap_or_else(|| EntityId::new("")),
            state: self.state.unwrap_or_else(|| "unknown".to_string()),
            attributes: self.attributes,
            last_changed: self.last_changed.unwrap_or(last_updated),
            last_updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    #[test]
    fn should_build_entity_state_with_all_fields() {
        let ts = now();
        let state = EntityState::builder()
            .entity_id("device_tracker.phone")
            .state("home")
            .location(52.37, 4.89)
            .last_updated(ts)
            .build();

        assert_eq!(state.entity_id.as_str(), "device_tracker.phone");
        assert_eq!(state.domain(), "device_tracker");
        assert_eq!(state.state, "home");
        assert_eq!(state.last_updated, ts);
        assert_eq!(state.last_changed, ts);
        assert_eq!(state.location(), Some(LatLng::new(52.37, 4.89)));
    }

    #[test]
    fn should_default_state_to_unknown() {
        let state = EntityState::builder().entity_id("sensor.x").build();
        assert_eq!(state.state, "unknown");
        assert!(state.attributes.is_empty());
    }

    #[test]
    fn should_have_no_location_when_a_coordinate_is_missing() {
        let state = EntityState::builder()
            .entity_id("device_tracker.phone")
            .attribute(ATTR_LATITUDE, AttributeValue::Float(52.0))
            .build();
        assert_eq!(state.location(), None);
    }

    #[test]
    fn should_have_no_location_when_a_coordinate_is_zero_or_null() {
        let zero = EntityState::builder()
            .entity_id("device_tracker.phone")
            .location(0.0, 4.89)
            .build();
        let null = EntityState::builder()
            .entity_id("device_tracker.phone")
            .attribute(ATTR_LATITUDE, AttributeValue::Json(serde_json::Value::Null))
            .attribute(ATTR_LONGITUDE, AttributeValue::Float(4.89))
            .build();
        assert_eq!(zero.location(), None);
        assert_eq!(null.location(), None);
    }

    #[test]
    fn should_expose_string_source_attribute() {
        let state = EntityState::builder()
            .entity_id("geo_location.quake")
            .attribute(ATTR_SOURCE, AttributeValue::String("usgs".to_string()))
            .build();
        assert_eq!(state.source(), Some("usgs"));
    }

    #[test]
    fn should_deserialize_host_state_object() {
        let json = r#"{
            "entity_id": "device_tracker.car",
            "state": "not_home",
            "attributes": {"latitude": 52.1, "longitude": 5.2, "gps_accuracy": 12},
            "last_changed": "2024-03-01T10:00:00Z",
            "last_updated": "2024-03-01T10:05:00Z"
        }"#;
        let state: EntityState = serde_json::from_str(json).unwrap();
        assert_eq!(state.location(), Some(LatLng::new(52.1, 5.2)));
        assert_eq!(
            state.get_attribute("gps_accuracy"),
            Some(&AttributeValue::Int(12))
        );
    }
}
