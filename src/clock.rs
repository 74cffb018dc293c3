//! Time source abstraction for real and simulated time.
//!
//! The scheduler never calls `Utc::now()` directly; it asks its `Clock`. The
//! daemon uses [`SystemClock`], while tests and the `simulate` command drive a
//! [`ManualClock`] forward one timer deadline at a time.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Mutex, PoisonError};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Whether this clock is driven manually rather than by wall time.
    fn is_simulated(&self) -> bool {
        false
    }
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    current: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Jump to `instant`. Moving backwards is allowed; tests use it to replay.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

/// Parse a `YYYY-MM-DD HH:MM:SS` string as local time in `tz`.
pub fn parse_datetime_in_tz(
    s: &str,
    tz: chrono_tz::Tz,
) -> Result<DateTime<chrono_tz::Tz>, String> {
    use chrono::{NaiveDateTime, TimeZone};

    let naive = NaiveDateTime::parse_from_str(s, crate::constants::SIMULATION_DATETIME_FORMAT)
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DD HH:MM:SS"))?;

    tz.from_local_datetime(&naive)
        .single()
        .ok_or_else(|| format!("Ambiguous or invalid time in timezone {tz}"))
}
