//! Map view values handed to the map-drawing collaborator.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::id::EntityId;

/// Opacity fade applied along every history path.
pub const PATH_GRADUAL_OPACITY: f64 = 0.8;

/// A geographic point, serialized as a `[latitude, longitude]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 2]", from = "[f64; 2]")]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(value: LatLng) -> Self {
        [value.latitude, value.longitude]
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([latitude, longitude]: [f64; 2]) -> Self {
        Self::new(latitude, longitude)
    }
}

/// A live marker: which entity to plot and in which color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapEntity {
    pub entity_id: EntityId,
    pub color: Color,
}

/// A drawable history trail for one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPath {
    pub points: Vec<LatLng>,
    pub color: Color,
    pub gradual_opacity: f64,
}

/// Everything the map-drawing collaborator needs for one render.
///
/// `entities` and `paths` are shared with the card's memo caches: an
/// unchanged input produces the same `Arc`, which lets the drawer skip work
/// with a pointer comparison.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub title: Option<String>,
    pub entities: Option<Arc<Vec<MapEntity>>>,
    pub paths: Option<Arc<Vec<MapPath>>>,
    pub zoom: f64,
    pub auto_fit: bool,
    pub dark_mode: bool,
}
