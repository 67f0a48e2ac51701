//! # mapcard-domain
//!
//! Pure domain model for the mapcard map widget.
//!
//! ## Responsibilities
//! - Foundational types: entity identifiers, error conventions, timestamps
//! - Define **entity states** and the identity-stable **state snapshot** the host
//!   replaces wholesale on every tick
//! - Define the validated **card configuration** and its error messages
//! - Define **map view** values (markers, paths, palette colors, aspect-ratio sizing)
//! - Define **history** requests and per-entity state sequences
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod aspect_ratio;
pub mod color;
pub mod config;
pub mod entity;
pub mod history;
pub mod map;
pub mod snapshot;
