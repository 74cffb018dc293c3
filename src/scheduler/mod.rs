//! Self-rescheduling occurrence scheduler.
//!
//! Every tracked key owns exactly one one-shot timer. When it fires the event
//! is emitted, the following occurrence is resolved, `next/<key>` is written,
//! and the timer is re-armed from inside the same callback. A separate daily
//! timer refreshes every `today/<key>` value at local midnight.
//!
//! The scheduler is a plain value shared through `Arc`; it holds the registry,
//! the sink, the clock and the timer set. The timer lock is only held to arm,
//! pop, or snapshot timers, never while calling the registry or the sink.
//!
//! ## Key Lifecycle
//!
//! `Unscheduled -> Armed(t) -> (fires) -> Armed(t') -> ...`
//!
//! If no occurrence resolves within the look-ahead window (polar day or
//! night), the key is armed with a probe one day out instead, so it is never
//! left without a timer.

pub mod executor;
pub mod refresh;


use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::clock::Clock;
use crate::constants::MAX_DISPATCH_WAIT_SECS;
use crate::display::{self, TimestampFormats};
use crate::registry::{EventKey, Registry};
use crate::thing::{Sink, next_property};
use crate::timer::{DueTimer, TimerId, TimerKind, TimerSet};

pub use executor::ExecutorHandle;
pub use refresh::{RefreshReport, next_local_midnight};

/// One armed per-key timer as reported by [`OccurrenceScheduler::list_scheduled`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledOccurrence {
    pub at: DateTime<Utc>,
    pub key: EventKey,
    pub kind: TimerKind,
}

/// Outcome of looking for the next fire instant of a key.
#[derive(Debug, Clone, Copy, PartialEq)]
enum NextFire {
    Occurrence(DateTime<Tz>),
    Probe(DateTime<Utc>),
}

pub struct OccurrenceScheduler {
    registry: Arc<Registry>,
    sink: Arc<dyn Sink>,
    clock: Arc<dyn Clock>,
    formats: TimestampFormats,
    lookahead_days: u32,
    timers: Mutex<TimerSet>,
    wakeup: Condvar,
}

impl OccurrenceScheduler {
    pub fn new(
        registry: Arc<Registry>,
        sink: Arc<dyn Sink>,
        clock: Arc<dyn Clock>,
        formats: TimestampFormats,
        lookahead_days: u32,
    ) -> Self {
        Self {
            registry,
            sink,
            clock,
            formats,
            lookahead_days,
            timers: Mutex::new(TimerSet::new()),
            wakeup: Condvar::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn timezone(&self) -> Tz {
        self.registry.timezone()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Schedule every key, refresh every `today/<key>`, and arm the daily refresh.
    pub fn prime(&self) {
        self.init_all();
        self.refresh_today();
        self.arm_daily_refresh();
    }

    pub fn init_all(&self) {
        for key in self.registry.keys() {
            self.init(key);
        }
    }

    /// Arm `key` for its first occurrence strictly after now.
    ///
    /// Today's occurrence is used if it is still ahead, otherwise tomorrow's.
    pub fn init(&self, key: &EventKey) {
        let now = self.clock.now();
        let next = self.next_occurrence(key, now);
        self.publish_and_arm(key, next);
    }

    /// Handle the arrival of `key`'s occurrence at `scheduled_at`.
    ///
    /// The event is emitted before `next/<key>` is overwritten, so a subscriber
    /// reading the property on notification still sees the instant that just
    /// elapsed. The timer is re-armed whatever the sink reports.
    pub fn on_fire(&self, key: &EventKey, scheduled_at: DateTime<Utc>) {
        let tz = self.timezone();
        log_block_start!(
            "{} ({})",
            self.display_name(key),
            scheduled_at.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S")
        );

        if let Err(e) = self.sink.emit_event(key.as_str(), None) {
            log_error!("Failed to emit {key}: {e}");
        }

        let now = self.clock.now().max(scheduled_at);
        let next = self.next_occurrence(key, now);
        self.publish_and_arm(key, next);

        if crate::logger::Log::is_debug() {
            display::log_schedule(&self.list_scheduled(), tz);
        }
    }

    /// Armed per-key timers sorted by instant, then key. The daily refresh is
    /// not included. Keys sharing an instant are all listed.
    pub fn list_scheduled(&self) -> Vec<ScheduledOccurrence> {
        let timers = self.lock_timers();
        let mut scheduled: Vec<ScheduledOccurrence> = timers
            .iter()
            .filter_map(|(id, timer)| match id {
                TimerId::Event(key) => Some(ScheduledOccurrence {
                    at: timer.at,
                    key: key.clone(),
                    kind: timer.kind,
                }),
                TimerId::DailyRefresh => None,
            })
            .collect();
        drop(timers);

        scheduled.sort_by(|a, b| a.at.cmp(&b.at).then_with(|| a.key.cmp(&b.key)));
        scheduled
    }

    /// Instant `key` is currently armed for.
    pub fn scheduled_for(&self, key: &EventKey) -> Option<DateTime<Utc>> {
        self.lock_timers()
            .get(&TimerId::Event(key.clone()))
            .map(|timer| timer.at)
    }

    /// Instant the daily refresh is armed for.
    pub fn refresh_scheduled_for(&self) -> Option<DateTime<Utc>> {
        self.lock_timers()
            .get(&TimerId::DailyRefresh)
            .map(|timer| timer.at)
    }

    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.lock_timers().next_deadline()
    }

    /// Fire every timer due at `now` on the calling thread, earliest first.
    ///
    /// Returns the timers that fired.
    pub fn run_due(&self, now: DateTime<Utc>) -> Vec<DueTimer> {
        let due = self.lock_timers().pop_due(now);
        for timer in &due {
            self.dispatch(timer.clone());
        }
        due
    }

    /// Run the callback for one due timer.
    pub fn dispatch(&self, timer: DueTimer) {
        match (timer.id, timer.kind) {
            (TimerId::Event(key), TimerKind::Probe) => {
                log_debug!("Probing {key} again");
                self.init(&key);
            }
            (TimerId::Event(key), _) => self.on_fire(&key, timer.at),
            (TimerId::DailyRefresh, _) => {
                self.refresh_today();
                self.arm_daily_refresh();
            }
        }
    }

    /// Cancel every timer, per-key and refresh alike.
    pub fn cancel_all(&self) {
        self.lock_timers().cancel_all();
        self.wakeup.notify_all();
    }

    /// Block until timers are due or `running` is cleared.
    ///
    /// Waits are capped so wall-clock jumps are noticed.
    pub(crate) fn wait_due(&self, running: &AtomicBool) -> Vec<DueTimer> {
        let max_wait = std::time::Duration::from_secs(MAX_DISPATCH_WAIT_SECS);
        let mut timers = self.lock_timers();

        loop {
            if !running.load(Ordering::SeqCst) {
                return Vec::new();
            }

            let now = self.clock.now();
            let due = timers.pop_due(now);
            if !due.is_empty() {
                return due;
            }

            let wait = timers
                .next_deadline()
                .and_then(|at| (at - now).to_std().ok())
                .map_or(max_wait, |until| until.min(max_wait));

            timers = self
                .wakeup
                .wait_timeout(timers, wait)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Wake the dispatcher so it re-reads the flag and deadlines.
    pub(crate) fn wake(&self) {
        let _timers = self.lock_timers();
        self.wakeup.notify_all();
    }

    fn arm(&self, id: TimerId, at: DateTime<Utc>, kind: TimerKind) {
        self.lock_timers().arm(id, at, kind);
        self.wakeup.notify_all();
    }

    fn lock_timers(&self) -> MutexGuard<'_, TimerSet> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn display_name(&self, key: &EventKey) -> String {
        self.registry
            .get(key.as_str())
            .map_or_else(|| key.to_string(), |d| d.display_name.clone())
    }

    /// First occurrence of `key` strictly after `now`.
    ///
    /// Starts from the local day before `now`, whose occurrence may still lie
    /// ahead when it falls after midnight, and walks forward one calendar day
    /// at a time, so 23 and 25 hour days are neither skipped nor visited twice.
    /// Days that fail to resolve count as "no occurrence that day". After the
    /// look-ahead window a probe one day out is returned instead.
    fn next_occurrence(&self, key: &EventKey, now: DateTime<Utc>) -> NextFire {
        let tz = self.timezone();
        let today = now.with_timezone(&tz).date_naive();
        let mut failures = 0u32;

        for day in -1..=i64::from(self.lookahead_days) {
            let date = today + Duration::days(day);
            let Some(reference) = local_noon(date, tz) else {
                if day >= 0 {
                    failures += 1;
                }
                continue;
            };
            match self.registry.resolve(key.as_str(), reference) {
                Ok(at) if at.with_timezone(&Utc) > now => {
                    if failures > 0 {
                        log_decorated!(
                            "{key}: next occurrence found after skipping {failures} day(s)"
                        );
                    }
                    return NextFire::Occurrence(at);
                }
                Ok(_) => {}
                // Yesterday only matters when its occurrence is still ahead
                Err(_) if day < 0 => {}
                Err(e) => {
                    if failures == 0 {
                        log_warning!("{key}: no occurrence on {date}: {e}");
                    }
                    failures += 1;
                }
            }
        }

        log_warning!(
            "{key}: nothing resolvable within {} days, probing again tomorrow",
            self.lookahead_days
        );
        NextFire::Probe(now + Duration::days(1))
    }

    /// Write `next/<key>` for `next`, then arm the key's timer for it.
    fn publish_and_arm(&self, key: &EventKey, next: NextFire) {
        let (at, kind, value) = match next {
            NextFire::Occurrence(at) => (
                at.with_timezone(&Utc),
                TimerKind::Occurrence,
                self.formats.format_next(&at),
            ),
            NextFire::Probe(at) => (at, TimerKind::Probe, String::new()),
        };

        if let Err(e) = self.sink.set_property(&next_property(key.as_str()), &value) {
            log_error!("Failed to update next/{key}: {e}");
        }

        self.arm(TimerId::Event(key.clone()), at, kind);
        log_debug!("{key} armed for {}", at.with_timezone(&self.timezone()));
    }
}

// Midday is never inside a DST transition, so it anchors a local date safely
fn local_noon(date: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
    let noon = date.and_hms_opt(12, 0, 0)?;
    tz.from_local_datetime(&noon)
        .earliest()
        .map(|at| at.with_timezone(&Utc))
}
