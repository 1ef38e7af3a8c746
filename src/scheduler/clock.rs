//! Wall-clock sources for the schedule window.

use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{Local, Timelike};

/// Supplies the current local hour (0-23).
pub trait Clock {
    /// Returns the current local hour.
    fn current_hour(&self) -> u32;
}

/// Reads the host's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_hour(&self) -> u32 {
        Local::now().hour()
    }
}

/// Clock pinned to a settable hour, for tests and `check --hour`.
#[derive(Debug, Default)]
pub struct FixedClock {
    hour: AtomicU32,
}

impl FixedClock {
    #[must_use]
    pub fn new(hour: u32) -> Self {
        Self {
            hour: AtomicU32::new(hour),
        }
    }

    pub fn set_hour(&self, hour: u32) {
        self.hour.store(hour, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn current_hour(&self) -> u32 {
        self.hour.load(Ordering::SeqCst)
    }
}
