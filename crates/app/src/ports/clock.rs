//! Clock port.

use mapcard_domain::time::{Timestamp, now};

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// [`Clock`] reading the system UTC time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        now()
    }
}
