//! Property-based tests for scheduling invariants.
//!
//! These run the scheduler against random observers and instants and check
//! the invariants every schedule must keep: one live timer per key, always
//! strictly in the future, listed in order.

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

use ephemeris::Observer;
use ephemeris::clock::ManualClock;
use ephemeris::config::Settings;
use ephemeris::display::TimestampFormats;
use ephemeris::scheduler::next_local_midnight;
use ephemeris::service::Service;

const ZONES: &[Tz] = &[
    chrono_tz::UTC,
    chrono_tz::Europe::Paris,
    chrono_tz::America::New_York,
    chrono_tz::America::Santiago,
    chrono_tz::Asia::Kolkata,
    chrono_tz::Australia::Lord_Howe,
    chrono_tz::Pacific::Auckland,
];

fn instant_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    // 2020-01-01 through 2029-12-31
    (0i64..3652, 0i64..86_400).prop_map(|(days, seconds)| {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
            + Duration::days(days)
            + Duration::seconds(seconds)
    })
}

fn zone_strategy() -> impl Strategy<Value = Tz> {
    (0..ZONES.len()).prop_map(|i| ZONES[i])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// After init every key has exactly one live timer, strictly after now
    #[test]
    fn test_init_arms_every_key_in_the_future(
        latitude in -60.0..60.0f64,
        longitude in -180.0..180.0f64,
        now in instant_strategy(),
        tz in zone_strategy(),
    ) {
        let settings = Settings {
            observer: Observer { latitude, longitude, elevation: 0.0 },
            timezone: tz,
            formats: TimestampFormats::default(),
            lookahead_days: 30,
        };
        let clock = Arc::new(ManualClock::new(now));
        let service = Service::builder(settings).with_clock(clock).build();

        service.scheduler.init_all();
        let schedule = service.scheduler.list_scheduled();

        prop_assert_eq!(schedule.len(), service.registry.list().len());
        let keys: HashSet<_> = schedule.iter().map(|e| e.key.clone()).collect();
        prop_assert_eq!(keys.len(), schedule.len());

        for entry in &schedule {
            prop_assert!(entry.at > now, "{} armed at {} <= {}", entry.key, entry.at, now);
        }
        for pair in schedule.windows(2) {
            prop_assert!((pair[0].at, &pair[0].key) <= (pair[1].at, &pair[1].key));
        }

        // Re-running init does not duplicate anything
        service.scheduler.init_all();
        prop_assert_eq!(service.scheduler.list_scheduled(), schedule);
    }

    /// The refresh instant is the first moment of the next local day
    #[test]
    fn test_next_local_midnight_starts_the_next_day(
        now in instant_strategy(),
        tz in zone_strategy(),
    ) {
        let midnight = next_local_midnight(now, tz);
        let local_now = now.with_timezone(&tz);
        let local_midnight = midnight.with_timezone(&tz);

        prop_assert!(midnight > now);
        prop_assert!(midnight - now <= Duration::hours(25));
        prop_assert_eq!(
            local_midnight.date_naive(),
            local_now.date_naive() + Duration::days(1)
        );
        // Midnight itself, or the first minute after a gap that swallowed it
        prop_assert!(local_midnight.hour() <= 1);
        prop_assert_eq!(local_midnight.second(), 0);

        let just_before = (midnight - Duration::seconds(1)).with_timezone(&tz);
        prop_assert_eq!(just_before.date_naive(), local_now.date_naive());
    }
}
