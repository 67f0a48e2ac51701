//! Card configuration: validated once, immutable afterwards.
//!
//! The raw configuration arrives as a loosely-typed JSON value written by the
//! user (or an editor). [`MapCardConfig::from_value`] checks it in a fixed
//! order and reports the first problem with a user-facing message.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigError;
use crate::id::EntityId;

/// Zoom level used when `default_zoom` is not configured.
pub const DEFAULT_ZOOM: f64 = 14.0;

/// Geo-source filter entry that matches every source.
pub const ALL_SOURCES: &str = "all";

/// Which geo-location entities are pulled in dynamically, by `source` attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoSourceFilter {
    sources: Vec<String>,
    includes_all: bool,
}

impl GeoSourceFilter {
    #[must_use]
    pub fn new(sources: Vec<String>) -> Self {
        let includes_all = sources.iter().any(|source| source == ALL_SOURCES);
        Self {
            sources,
            includes_all,
        }
    }

    #[must_use]
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Whether an entity declaring `source` passes the filter.
    #[must_use]
    pub fn matches(&self, source: Option<&str>) -> bool {
        self.includes_all
            || source.is_some_and(|source| self.sources.iter().any(|s| s == source))
    }
}

/// A validated map card configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MapCardConfig {
    /// Explicitly configured entities, in configured order.
    pub entities: Option<Vec<EntityId>>,
    pub geo_location_sources: Option<GeoSourceFilter>,
    /// Length of the history window; absent or `<= 0` disables history.
    pub hours_to_show: Option<f64>,
    pub default_zoom: Option<f64>,
    pub auto_fit: bool,
    /// Explicit map theme; `None` follows the host theme.
    pub dark_mode: Option<bool>,
    pub aspect_ratio: Option<String>,
    pub title: Option<String>,
}

/// Scalar display options, read with serde once the entity lists are checked.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DisplayOptions {
    hours_to_show: Option<f64>,
    default_zoom: Option<f64>,
    auto_fit: Option<bool>,
    dark_mode: Option<bool>,
    aspect_ratio: Option<String>,
    title: Option<String>,
}

impl MapCardConfig {
    /// Validate a raw configuration value.
    ///
    /// # Errors
    ///
    /// In order of precedence:
    /// - [`ConfigError::Missing`] when `value` is `null` or otherwise falsy;
    /// - [`ConfigError::NoEntitySource`] when there is neither a non-empty
    ///   `entities` nor a `geo_location_sources`;
    /// - [`ConfigError::EntitiesNotArray`] / [`ConfigError::GeoSourcesNotArray`]
    ///   when either list is not an array;
    /// - item-level errors for malformed entries;
    /// - [`ConfigError::InvalidOption`] when a display option has the wrong type.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        if !is_truthy(value) {
            return Err(ConfigError::Missing);
        }
        let Value::Object(object) = value else {
            return Err(ConfigError::NoEntitySource);
        };

        let entities = object.get("entities").filter(|v| is_truthy(v));
        let geo_sources = object.get("geo_location_sources").filter(|v| is_truthy(v));

        if !entities.is_some_and(has_length) && geo_sources.is_none() {
            return Err(ConfigError::NoEntitySource);
        }
        if entities.is_some_and(|v| !v.is_array()) {
            return Err(ConfigError::EntitiesNotArray);
        }
        if geo_sources.is_some_and(|v| !v.is_array()) {
            return Err(ConfigError::GeoSourcesNotArray);
        }

        let entities = entities
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .map(parse_entities)
            .transpose()?;
        let geo_location_sources = geo_sources
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .map(parse_geo_sources)
            .transpose()?;

        let options = DisplayOptions::deserialize(value).map_err(ConfigError::InvalidOption)?;

        Ok(Self {
            entities,
            geo_location_sources,
            hours_to_show: options.hours_to_show,
            default_zoom: options.default_zoom,
            auto_fit: options.auto_fit.unwrap_or(false),
            dark_mode: options.dark_mode,
            aspect_ratio: options.aspect_ratio,
            title: options.title,
        })
    }

    /// Explicitly configured entity ids; empty when only geo sources are used.
    #[must_use]
    pub fn entity_ids(&self) -> &[EntityId] {
        self.entities.as_deref().unwrap_or_default()
    }

    /// The history window in hours, when history is enabled.
    #[must_use]
    pub fn history_hours(&self) -> Option<f64> {
        self.hours_to_show.filter(|hours| *hours > 0.0)
    }

    #[must_use]
    pub fn history_enabled(&self) -> bool {
        self.history_hours().is_some()
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.default_zoom.unwrap_or(DEFAULT_ZOOM)
    }
}

impl TryFrom<&Value> for MapCardConfig {
    type Error = ConfigError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn parse_entities(items: &[Value]) -> Result<Vec<EntityId>, ConfigError> {
    items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            let raw = match item {
                Value::String(raw) => raw.clone(),
                Value::Object(object) => match object.get("entity") {
                    Some(Value::String(raw)) => raw.clone(),
                    Some(other) => other.to_string(),
                    None => return Err(ConfigError::MissingEntityField(position)),
                },
                _ => return Err(ConfigError::InvalidEntity(position)),
            };
            raw.parse::<EntityId>()
                .map_err(|_| ConfigError::InvalidEntityId {
                    position,
                    entity_id: raw,
                })
        })
        .collect()
}

fn parse_geo_sources(items: &[Value]) -> Result<GeoSourceFilter, ConfigError> {
    items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or(ConfigError::InvalidGeoSource(position))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(GeoSourceFilter::new)
}

/// Loose truthiness of a configuration value: `null`, `false`, `0`, `""`
/// are falsy; arrays and objects are truthy even when empty.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(value) => *value,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(value) => !value.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whether the value has a non-zero `length` (non-empty array or string).
fn has_length(value: &Value) -> bool {
    match value {
        Value::Array(items) => !items.is_empty(),
        Value::String(raw) => !raw.is_empty(),
        _ => false,
    }
}
