// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-timer-wheel scheduler
//!
//! Holds every pending timer in one binary heap. Arming an id that is
//! already pending replaces it: each id carries a generation counter,
//! and heap entries from older generations are dropped unfired when
//! they surface.

use fallow_core::Event;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
struct TimerEntry {
    deadline: Instant,
    generation: u64,
    id: String,
    /// Re-armed at this period after every fire (interval sub-mode)
    repeat: Option<Duration>,
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.deadline
            .cmp(&other.deadline)
            .then_with(|| self.generation.cmp(&other.generation))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Timer scheduler backed by a min-heap
#[derive(Debug, Default)]
pub struct Scheduler {
    heap: BinaryHeap<Reverse<TimerEntry>>,
    /// Current generation per live timer id; stale heap entries lose.
    live: HashMap<String, u64>,
    next_generation: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot timer, replacing any pending timer with the same id.
    pub fn set_timer(&mut self, id: String, duration: Duration, now: Instant) {
        self.arm(id, duration, now, None);
    }

    /// Arm a repeating timer that re-fires every `period`.
    pub fn set_repeating(&mut self, id: String, period: Duration, now: Instant) {
        self.arm(id, period, now, Some(period));
    }

    fn arm(&mut self, id: String, duration: Duration, now: Instant, repeat: Option<Duration>) {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.live.insert(id.clone(), generation);
        self.heap.push(Reverse(TimerEntry {
            deadline: now + duration,
            generation,
            id,
            repeat,
        }));
    }

    /// Cancel a pending timer; unknown ids are a no-op.
    pub fn cancel_timer(&mut self, id: &str) {
        self.live.remove(id);
    }

    /// Cancel every pending timer.
    pub fn cancel_all(&mut self) {
        self.live.clear();
        self.heap.clear();
    }

    /// Pop all timers whose deadline has passed, in deadline order.
    ///
    /// Repeating timers are re-armed at their period; one-shots are
    /// consumed. Stale entries from replaced or cancelled timers are
    /// discarded silently.
    pub fn fired_timers(&mut self, now: Instant) -> Vec<Event> {
        let mut fired = Vec::new();
        while let Some(Reverse(entry)) = self.heap.peek() {
            if entry.deadline > now {
                break;
            }
            let Some(Reverse(entry)) = self.heap.pop() else {
                break;
            };
            if self.live.get(&entry.id) != Some(&entry.generation) {
                continue;
            }
            match entry.repeat {
                Some(period) => self.heap.push(Reverse(TimerEntry {
                    deadline: entry.deadline + period,
                    ..entry.clone()
                })),
                None => {
                    self.live.remove(&entry.id);
                }
            }
            fired.push(Event::TimerFired { id: entry.id });
        }
        fired
    }

    pub fn has_timers(&self) -> bool {
        !self.live.is_empty()
    }

    /// Earliest live deadline, for the event loop's sleep bound.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap
            .iter()
            .filter(|Reverse(e)| self.live.get(&e.id) == Some(&e.generation))
            .map(|Reverse(e)| e.deadline)
            .min()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
