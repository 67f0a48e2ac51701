//! Memoized derivations from host state to map overlays.
//!
//! Both derivations share the card's [`ColorCache`](crate::color_cache::ColorCache)
//! and return `Arc`s that stay pointer-equal while their inputs do.

pub mod entities;
pub mod paths;

pub use entities::EntityResolver;
pub use paths::PathDeriver;
