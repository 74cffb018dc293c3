//! Presentation of occurrence instants.
//!
//! The format of `today/<key>` and `next/<key>` values is a deployment choice,
//! so both are chrono format strings carried in [`TimestampFormats`] rather
//! than fixed in the scheduler.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::constants::{DEFAULT_NEXT_FORMAT, DEFAULT_TODAY_FORMAT};
use crate::scheduler::ScheduledOccurrence;
use crate::timer::TimerKind;

#[derive(Debug, Clone, PartialEq)]
pub struct TimestampFormats {
    pub today: String,
    pub next: String,
}

impl Default for TimestampFormats {
    fn default() -> Self {
        Self {
            today: DEFAULT_TODAY_FORMAT.to_string(),
            next: DEFAULT_NEXT_FORMAT.to_string(),
        }
    }
}

impl TimestampFormats {
    pub fn format_today(&self, instant: &DateTime<Tz>) -> String {
        instant.format(&self.today).to_string()
    }

    pub fn format_next(&self, instant: &DateTime<Tz>) -> String {
        instant.format(&self.next).to_string()
    }
}

/// Whether chrono can render `format` without hitting an invalid specifier.
pub fn is_valid_format(format: &str) -> bool {
    !format.is_empty() && !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Log the current schedule, one line per armed key, earliest first.
pub fn log_schedule(schedule: &[ScheduledOccurrence], tz: Tz) {
    for entry in schedule {
        log_indented!("{}", schedule_line(entry, tz));
    }
}

/// `2024-06-01 21:45:12 +02:00  sunset` style line; probes are flagged.
pub fn schedule_line(entry: &ScheduledOccurrence, tz: Tz) -> String {
    let at = entry.at.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S %:z");
    match entry.kind {
        TimerKind::Probe => format!("{at}  {} (probe)", entry.key),
        _ => format!("{at}  {}", entry.key),
    }
}

/// Human readable "in 3h 12m" relative to `now`.
pub fn format_until(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (at - now).num_minutes().max(0);
    let hours = minutes / 60;
    if hours > 0 {
        format!("in {}h {}m", hours, minutes % 60)
    } else {
        format!("in {}m", minutes)
    }
}
