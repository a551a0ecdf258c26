//! Wall-clock abstraction so repositories can be tested with a pinned time.

use chrono::{NaiveDateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clock {
    /// Real time (UTC). Used by the binaries.
    System,
    /// Pinned time. Used in tests.
    Fixed(NaiveDateTime),
}

impl Clock {
    pub fn now(&self) -> NaiveDateTime {
        match self {
            Clock::System => Utc::now().naive_utc(),
            Clock::Fixed(at) => *at,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::System
    }
}
