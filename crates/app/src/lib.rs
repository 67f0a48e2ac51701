//! # mapcard-app
//!
//! Application layer: the map card pipeline and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `HistoryProvider`: bounded history retrieval for several entities
//!   - `MapRenderer`: draws a [`MapView`](mapcard_domain::map::MapView) and re-centers it
//!   - `Clock`: wall-clock source for the refresh cadence
//! - Provide the **derivation pipeline**: color assignment, memoized entity
//!   resolution and path derivation
//! - Provide the **change gate** and the **history refresh scheduler**
//! - Wire everything together in [`card::MapCard`], the driving port the host
//!   calls into
//!
//! ## Dependency rule
//! Depends on `mapcard-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod card;
pub mod change_gate;
pub mod color_cache;
pub mod derive;
pub mod history_scheduler;
pub mod memo;
pub mod ports;
pub mod stub_config;
