//! Timer system for Cadenza.
//!
//! Provides one-shot and repeating timers for the cooperative event loop:
//! the loop calls [`TimerManager::poll`] each iteration and dispatches the
//! returned timer IDs itself. Starting a timer that is already running
//! restarts it; there is no queuing of multiple firings.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{new_key_type, SlotMap};

use crate::error::TimerError;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// The type of timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Fires once, then deactivates.
    OneShot,
    /// Fires repeatedly at the specified interval.
    Repeating,
}

/// Internal timer data.
#[derive(Debug)]
struct TimerData {
    /// When this timer should next fire.
    next_fire: Instant,
    /// The interval between firings (also the initial delay).
    interval: Duration,
    /// The kind of timer.
    kind: TimerKind,
    /// Whether this timer is active.
    active: bool,
}

/// An entry in the timer queue (min-heap by fire time).
///
/// Entries are not removed when a timer is stopped or restarted; they are
/// recognized as stale in [`TimerManager::poll`] by comparing against the
/// timer's current `next_fire`.
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.fire_time.cmp(&self.fire_time)
    }
}

/// Manages all timers for one event loop.
pub struct TimerManager {
    /// All registered timers.
    timers: SlotMap<TimerId, TimerData>,
    /// Priority queue of pending timer fires (min-heap by fire time).
    queue: BinaryHeap<TimerQueueEntry>,
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerManager {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
        }
    }

    /// Start a one-shot timer that fires after `duration`.
    ///
    /// Returns the timer ID used to restart or stop the timer.
    pub fn start_one_shot(&mut self, duration: Duration) -> TimerId {
        self.insert(duration, TimerKind::OneShot)
    }

    /// Start a repeating timer that fires every `interval`, first after
    /// `interval`.
    pub fn start_repeating(&mut self, interval: Duration) -> TimerId {
        self.insert(interval, TimerKind::Repeating)
    }

    fn insert(&mut self, interval: Duration, kind: TimerKind) -> TimerId {
        let next_fire = Instant::now() + interval;
        let id = self.timers.insert(TimerData {
            next_fire,
            interval,
            kind,
            active: true,
        });
        self.queue.push(TimerQueueEntry {
            id,
            fire_time: next_fire,
        });
        tracing::trace!(target: "cadenza_core::timer", ?id, ?kind, ?interval, "started timer");
        id
    }

    /// Restart a timer from now, whether or not it already fired.
    ///
    /// An already-running timer is rescheduled, not queued twice. A fired
    /// one-shot timer becomes active again.
    pub fn restart(&mut self, id: TimerId) -> Result<(), TimerError> {
        let data = self.timers.get_mut(id).ok_or(TimerError::InvalidTimerId)?;
        data.next_fire = Instant::now() + data.interval;
        data.active = true;
        self.queue.push(TimerQueueEntry {
            id,
            fire_time: data.next_fire,
        });
        Ok(())
    }

    /// Stop and remove a timer. Idempotent: stopping an unknown or already
    /// removed timer is a no-op.
    pub fn stop(&mut self, id: TimerId) {
        if self.timers.remove(id).is_some() {
            tracing::trace!(target: "cadenza_core::timer", ?id, "stopped timer");
        }
    }

    /// Whether the timer exists and is waiting to fire.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.get(id).is_some_and(|data| data.active)
    }

    /// The earliest pending deadline, for use as an event-poll timeout.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers
            .values()
            .filter(|data| data.active)
            .map(|data| data.next_fire)
            .min()
    }

    /// Collect all timers due at `now`, in firing order.
    ///
    /// One-shot timers deactivate; repeating timers are rescheduled one
    /// interval ahead. A timer appears at most once per poll.
    pub fn poll(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();

            let Some(data) = self.timers.get_mut(entry.id) else {
                continue; // stopped since it was queued
            };
            // A restart leaves the old queue entry behind; only the entry
            // matching the current schedule fires.
            if !data.active || data.next_fire != entry.fire_time {
                continue;
            }

            match data.kind {
                TimerKind::OneShot => {
                    data.active = false;
                }
                TimerKind::Repeating => {
                    // Catch-up bursts are never delivered; a late poll gets
                    // one firing and the schedule continues from now.
                    let mut next = entry.fire_time + data.interval;
                    if next <= now {
                        next = now + data.interval;
                    }
                    data.next_fire = next;
                    self.queue.push(TimerQueueEntry {
                        id: entry.id,
                        fire_time: next,
                    });
                }
            }
            fired.push(entry.id);
        }

        fired
    }
}
