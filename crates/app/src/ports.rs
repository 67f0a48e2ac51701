//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the card pipeline and the outside world.
//! They are defined here (in `app`) so that both the pipeline and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod clock;
pub mod history;
pub mod map_renderer;

pub use clock::{Clock, SystemClock};
pub use history::HistoryProvider;
pub use map_renderer::MapRenderer;
