//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`MapCardError`] at port boundaries via `#[from]` or `Box`.

/// Rejections raised while validating a card configuration.
///
/// The display strings are user-facing: the host shows them verbatim in
/// place of the card.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration value is absent, `null`, or not an object.
    #[error("Error in card configuration.")]
    Missing,

    /// Neither explicit entities nor a geo-location source filter were given.
    #[error("Either entities or geo_location_sources must be specified")]
    NoEntitySource,

    /// `entities` is present but is not a list.
    #[error("Entities need to be an array")]
    EntitiesNotArray,

    /// `geo_location_sources` is present but is not a list.
    #[error("Geo_location_sources needs to be an array")]
    GeoSourcesNotArray,

    /// An `entities` item is neither a string nor an object.
    #[error("Invalid entity ID at position {0}")]
    InvalidEntity(usize),

    /// An `entities` item is an object without an `entity` key.
    #[error("Object at position {0} is missing entity field")]
    MissingEntityField(usize),

    /// An `entities` item names a malformed entity id.
    #[error("Invalid entity ID at position {position}: {entity_id}")]
    InvalidEntityId { position: usize, entity_id: String },

    /// A `geo_location_sources` item is not a string.
    #[error("Invalid geo location source at position {0}.")]
    InvalidGeoSource(usize),

    /// A display option has the wrong type (e.g. `hours_to_show: "six"`).
    #[error("invalid card option")]
    InvalidOption(#[source] serde_json::Error),
}

/// Top-level error crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum MapCardError {
    /// The card configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The history retrieval collaborator failed.
    #[error("history retrieval failed")]
    History(#[source] Box<dyn std::error::Error + Send + Sync>),
}
