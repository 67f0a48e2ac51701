//! Entity identifiers of the form `<domain>.<object_id>`.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Domain of externally-fed geo-location entities (earthquakes, fires, …).
pub const GEO_LOCATION_DOMAIN: &str = "geo_location";

/// Domain of tracked devices (phones, cars, tags).
pub const DEVICE_TRACKER_DOMAIN: &str = "device_tracker";

/// Identifier of an entity in the global state snapshot (e.g. `device_tracker.phone`).
///
/// Construction through [`EntityId::new`] is unchecked because ids coming from
/// the host are trusted; [`FromStr`] validates the `<domain>.<object_id>` shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wrap an identifier without validating it.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before the first `.`, or `""` when there is none.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('.').map_or("", |(domain, _)| domain)
    }

    /// The part after the first `.`, or the whole id when there is none.
    #[must_use]
    pub fn object_id(&self) -> &str {
        self.0.split_once('.').map_or(&self.0, |(_, object_id)| object_id)
    }

    /// Whether the id matches `<slug>.<slug>`, where a slug is lowercase
    /// ascii alphanumerics and underscores, not starting or ending with `_`,
    /// and the domain slug holds no `__`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let Some((domain, object_id)) = self.0.split_once('.') else {
            return false;
        };
        is_slug(domain) && !domain.contains("__") && is_slug(object_id)
    }
}

fn is_slug(part: &str) -> bool {
    !part.is_empty()
        && !part.starts_with('_')
        && !part.ends_with('_')
        && part
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Returned when parsing a string that is not a well-formed entity id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid entity id {0:?}")]
pub struct ParseEntityIdError(pub String);

impl FromStr for EntityId {
    type Err = ParseEntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = Self::new(s);
        if id.is_valid() {
            Ok(id)
        } else {
            Err(ParseEntityIdError(s.to_string()))
        }
    }
}
