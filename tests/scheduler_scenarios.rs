use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Europe::Paris;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

use ephemeris::clock::ManualClock;
use ephemeris::commands::simulate::fast_forward;
use ephemeris::config::{self, Settings};
use ephemeris::display::TimestampFormats;
use ephemeris::service::Service;
use ephemeris::thing::Sink;
use ephemeris::timer::TimerKind;
use ephemeris::{EventKey, Observer};

fn paris_settings() -> Settings {
    Settings {
        observer: Observer {
            latitude: 48.85,
            longitude: 2.35,
            elevation: 0.0,
        },
        timezone: Paris,
        formats: TimestampFormats::default(),
        lookahead_days: 30,
    }
}

fn paris_local(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Paris
        .with_ymd_and_hms(y, m, d, h, 0, 0)
        .unwrap()
        .with_timezone(&Utc)
}

#[test]
fn test_paris_morning_schedule() {
    // 10:00 local: sunrise already happened today, sunset has not
    let clock = Arc::new(ManualClock::new(paris_local(2024, 6, 1, 10)));
    let service = Service::builder(paris_settings())
        .with_clock(clock.clone())
        .build();

    service.scheduler.prime();

    let schedule = service.scheduler.list_scheduled();
    assert_eq!(schedule.len(), 14);

    let sunrise = schedule
        .iter()
        .find(|e| e.key == EventKey::new("sunrise"))
        .unwrap();
    let sunset = schedule
        .iter()
        .find(|e| e.key == EventKey::new("sunset"))
        .unwrap();

    assert_eq!(
        sunrise.at.with_timezone(&Paris).format("%Y-%m-%d").to_string(),
        "2024-06-02"
    );
    assert_eq!(
        sunset.at.with_timezone(&Paris).format("%Y-%m-%d").to_string(),
        "2024-06-01"
    );
    assert!(sunset.at < sunrise.at);

    // Nothing between 10:00 and solar noon
    assert_eq!(schedule[0].key, EventKey::new("noon"));
    for pair in schedule.windows(2) {
        assert!(pair[0].at <= pair[1].at);
    }

    let today_sunrise = service.thing.get_property("today/sunrise").unwrap();
    let next_sunrise = service.thing.get_property("next/sunrise").unwrap();
    assert!(today_sunrise.starts_with("05:"), "{today_sunrise}");
    assert!(next_sunrise.starts_with("2024-06-02 05:"), "{next_sunrise}");
}

#[test]
fn test_three_days_across_dst_change() {
    // Paris springs forward on 2024-03-31
    let start = Utc.with_ymd_and_hms(2024, 3, 30, 10, 0, 0).unwrap();
    let end = start + Duration::days(3);

    let clock = Arc::new(ManualClock::new(start));
    let service = Service::builder(paris_settings())
        .with_clock(clock.clone())
        .build();
    let events = service.thing.subscribe();

    service.scheduler.prime();
    let summary = fast_forward(&service.scheduler, &clock, end);
    assert_eq!(summary.refreshes, 3);

    let fired: Vec<_> = events.try_iter().collect();
    assert_eq!(fired.len(), 14 * 3);

    for event in &fired {
        // Subscribers see the instant that just elapsed
        let expected = event
            .emitted_at
            .with_timezone(&Paris)
            .format("%Y-%m-%d %H:%M")
            .to_string();
        assert_eq!(event.payload.as_deref(), Some(expected.as_str()));
    }

    for entry in service.scheduler.list_scheduled() {
        assert!(entry.at > end);
        assert_eq!(entry.kind, TimerKind::Occurrence);
    }
}

#[test]
fn test_polar_night_keeps_every_key_scheduled() {
    let settings = Settings {
        observer: Observer {
            latitude: 78.22,
            longitude: 15.65,
            elevation: 0.0,
        },
        timezone: chrono_tz::Arctic::Longyearbyen,
        formats: TimestampFormats::default(),
        lookahead_days: 30,
    };
    let start = Utc.with_ymd_and_hms(2024, 12, 1, 12, 0, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let service = Service::builder(settings).with_clock(clock.clone()).build();

    service.scheduler.prime();
    fast_forward(&service.scheduler, &clock, start + Duration::days(2));

    let schedule = service.scheduler.list_scheduled();
    assert_eq!(schedule.len(), 14);

    let sunrise = schedule
        .iter()
        .find(|e| e.key == EventKey::new("sunrise"))
        .unwrap();
    assert_eq!(sunrise.kind, TimerKind::Probe);
    assert_eq!(service.thing.get_property("next/sunrise").as_deref(), Some(""));

    let noon = schedule
        .iter()
        .find(|e| e.key == EventKey::new("noon"))
        .unwrap();
    assert_eq!(noon.kind, TimerKind::Occurrence);
}

#[test]
fn test_configured_service_from_file() {
    let temp_dir = tempdir().unwrap();
    fs::write(
        temp_dir.path().join("ephemeris.toml"),
        r#"
latitude = 48.85
longitude = 2.35
location = "Europe/Paris"
today_format = "%Hh%M"
next_format = "%d/%m %H:%M"
"#,
    )
    .unwrap();

    let (settings, _) = config::load(Some(temp_dir.path())).unwrap();
    let clock = Arc::new(ManualClock::new(paris_local(2024, 6, 1, 10)));
    let service = Service::builder(settings).with_clock(clock).build();

    service.scheduler.init_all();

    let next_sunset = service.thing.get_property("next/sunset").unwrap();
    assert!(next_sunset.starts_with("01/06 21:"), "{next_sunset}");

    let description = serde_json::to_value(service.thing.description()).unwrap();
    assert_eq!(description["properties"].as_array().unwrap().len(), 28);
    assert_eq!(description["events"].as_array().unwrap().len(), 14);

    // today/<key> values no longer follow HH:MM, so no pattern is declared
    assert_eq!(description["properties"][0]["name"], "today/dawnAstronomical");
    assert!(description["properties"][0]["schema"].get("pattern").is_none());
}
