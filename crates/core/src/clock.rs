// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling

use chrono::NaiveDateTime;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A clock that provides the current time
///
/// Monotonic instants drive timers; the local wall clock drives
/// policy evaluation (next-fire instants are wall-clock values).
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> Instant;
    fn wall_now(&self) -> NaiveDateTime;
}

/// Real system clock
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<(Instant, NaiveDateTime)>>,
}

impl FakeClock {
    /// Starts at the current monotonic instant and a fixed wall time
    /// (2024-01-01T00:00:00) so tests are date-deterministic.
    pub fn new() -> Self {
        let wall = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap_or_default()
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default();
        Self {
            current: Arc::new(Mutex::new((Instant::now(), wall))),
        }
    }

    /// Advance both the monotonic and wall clocks by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        current.0 += duration;
        let nanos = duration.as_nanos().min(i64::MAX as u128) as i64;
        current.1 += chrono::Duration::nanoseconds(nanos);
    }

    /// Set the wall clock to a specific local date-time
    pub fn set_wall(&self, wall: NaiveDateTime) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        current.1 = wall;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).0
    }

    fn wall_now(&self) -> NaiveDateTime {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).1
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
