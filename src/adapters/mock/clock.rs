use crate::ports::clock::Clock as ClockTrait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Mutex, PoisonError};

/// Manually driven Clock for tests and demos
///
/// Time only moves when `advance` or `set` is called, which keeps
/// borrow/return timestamps reproducible.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    /// Jump to a point in time; earlier instants are ignored
    pub fn set(&self, to: DateTime<Utc>) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        if to > *now {
            *now = to;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
                .single()
                .unwrap_or_default(),
        )
    }
}

impl ClockTrait for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
