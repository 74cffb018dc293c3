//! One-shot timers keyed by absolute instant.
//!
//! A `TimerSet` holds at most one live timer per [`TimerId`]. Arming an id that
//! already has a timer replaces it in the same call. Replaced timers stay in
//! the heap until they surface and are discarded by generation, so replacement
//! never searches the heap.
//!
//! A timer returned by [`TimerSet::pop_due`] stays live, marked as firing,
//! until its callback arms the id again. Listings therefore never see an id
//! disappear between a fire and its re-arm.

use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::registry::EventKey;

/// What a timer belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerId {
    Event(EventKey),
    DailyRefresh,
}

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// The event occurs at this instant
    Occurrence,
    /// No occurrence was resolvable; look again at this instant
    Probe,
    /// Recompute all `today/<key>` values
    Refresh,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArmedTimer {
    pub at: DateTime<Utc>,
    pub kind: TimerKind,
    pub firing: bool,
    generation: u64,
}

/// A timer whose instant has arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct DueTimer {
    pub id: TimerId,
    pub at: DateTime<Utc>,
    pub kind: TimerKind,
}

#[derive(Debug, Default)]
pub struct TimerSet {
    heap: BinaryHeap<Reverse<(DateTime<Utc>, u64, TimerId)>>,
    live: HashMap<TimerId, ArmedTimer>,
    next_generation: u64,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `id` for `at`, returning the timer it replaced.
    pub fn arm(&mut self, id: TimerId, at: DateTime<Utc>, kind: TimerKind) -> Option<ArmedTimer> {
        let generation = self.next_generation;
        self.next_generation += 1;

        self.heap.push(Reverse((at, generation, id.clone())));
        self.live.insert(
            id,
            ArmedTimer {
                at,
                kind,
                firing: false,
                generation,
            },
        )
    }

    pub fn cancel(&mut self, id: &TimerId) -> Option<ArmedTimer> {
        self.live.remove(id)
    }

    pub fn cancel_all(&mut self) {
        self.live.clear();
        self.heap.clear();
    }

    pub fn get(&self, id: &TimerId) -> Option<&ArmedTimer> {
        self.live.get(id)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TimerId, &ArmedTimer)> {
        self.live.iter()
    }

    /// Earliest instant a pending timer is due.
    pub fn next_deadline(&mut self) -> Option<DateTime<Utc>> {
        self.discard_stale();
        self.heap.peek().map(|Reverse((at, _, _))| *at)
    }

    /// Remove every pending timer due at or before `now`, earliest first.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Vec<DueTimer> {
        let mut due = Vec::new();

        while let Some(at) = self.next_deadline() {
            if at > now {
                break;
            }
            let Some(Reverse((at, _, id))) = self.heap.pop() else {
                break;
            };
            if let Some(timer) = self.live.get_mut(&id) {
                timer.firing = true;
                due.push(DueTimer {
                    id,
                    at,
                    kind: timer.kind,
                });
            }
        }

        due
    }

    // Drop heap heads that were replaced, cancelled, or already popped
    fn discard_stale(&mut self) {
        while let Some(Reverse((_, generation, id))) = self.heap.peek() {
            let current = self
                .live
                .get(id)
                .is_some_and(|t| t.generation == *generation && !t.firing);
            if current {
                break;
            }
            self.heap.pop();
        }
    }
}
