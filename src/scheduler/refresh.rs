//! Daily recomputation of every `today/<key>` property.
//!
//! Runs once when the scheduler is primed and then at every local midnight.
//! A key that cannot be resolved for the day keeps its previous value; the
//! others are still updated.

use chrono::{DateTime, Duration, LocalResult, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::OccurrenceScheduler;
use crate::registry::EventKey;
use crate::thing::today_property;
use crate::timer::{TimerId, TimerKind};

/// Outcome of one refresh pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshReport {
    pub updated: Vec<EventKey>,
    pub failed: Vec<EventKey>,
}

impl OccurrenceScheduler {
    /// Resolve every key for the current local day and write `today/<key>`.
    pub fn refresh_today(&self) -> RefreshReport {
        let now = self.now();
        let tz = self.timezone();
        let mut report = RefreshReport::default();

        for key in self.registry().keys() {
            let value = match self.registry().resolve(key.as_str(), now) {
                Ok(at) => self.formats.format_today(&at),
                Err(e) => {
                    log_debug!("today/{key} left unchanged: {e}");
                    report.failed.push(key.clone());
                    continue;
                }
            };

            match self.sink.set_property(&today_property(key.as_str()), &value) {
                Ok(()) => report.updated.push(key.clone()),
                Err(e) => {
                    log_error!("Failed to update today/{key}: {e}");
                    report.failed.push(key.clone());
                }
            }
        }

        log_decorated!(
            "Refreshed today's values for {}: {} updated, {} unchanged",
            now.with_timezone(&tz).date_naive(),
            report.updated.len(),
            report.failed.len()
        );
        report
    }

    /// Arm the refresh timer for the next local midnight.
    pub fn arm_daily_refresh(&self) {
        let at = next_local_midnight(self.now(), self.timezone());
        self.arm(TimerId::DailyRefresh, at, TimerKind::Refresh);
        log_debug!("Daily refresh armed for {}", at.with_timezone(&self.timezone()));
    }
}

/// First instant of the local day after the one containing `now`.
///
/// When midnight falls into a DST gap the first valid local time after it is
/// used; when it is ambiguous the earlier instant wins.
pub fn next_local_midnight(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let tomorrow = now.with_timezone(&tz).date_naive() + Duration::days(1);
    let midnight = tomorrow.and_time(NaiveTime::MIN);

    for offset in 0..=24 * 60 {
        let candidate = midnight + Duration::minutes(offset);
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(at) => return at.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
            LocalResult::None => continue,
        }
    }

    // No zone has a whole day missing; fall back to a plain day ahead
    now + Duration::days(1)
}
