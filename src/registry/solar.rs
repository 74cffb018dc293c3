//! Solar occurrence functions.
//!
//! Horizon crossings (dawn, sunrise, golden hour bounds, sunset, dusk) come
//! from the `sunrise` crate. Noon and midnight use the NOAA equation of time,
//! which the crate does not expose.
//!
//! Near the poles the sun may never reach a given elevation on a given day.
//! The solver does not report that case, so the declination for the day is
//! checked first and the day is rejected with [`ResolveError::NoOccurrence`].
//! Anything the solver returns that is not within a day of the requested date
//! is rejected as [`ResolveError::OutOfRange`].

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use sunrise::{Coordinates, DawnType, SolarDay, SolarEvent};

use super::{EventDefinition, Observer, ResolveError};
use crate::constants::*;

const UNIX_EPOCH_JULIAN_DAY: f64 = 2_440_587.5;
const J2000_JULIAN_DAY: f64 = 2_451_545.0;

/// The fourteen standard events in the order they occur through a day.
pub fn standard_definitions() -> Vec<EventDefinition> {
    vec![
        EventDefinition::new(
            "dawnAstronomical",
            "Dawn (Astronomical)",
            "the Sun rises to 18° below the horizon",
            |observer, reference| {
                crossing(
                    observer,
                    reference,
                    SolarEvent::Dawn(DawnType::Astronomical),
                    ASTRONOMICAL_ELEVATION,
                )
            },
        ),
        EventDefinition::new(
            "dawnNautical",
            "Dawn (Nautical)",
            "the Sun rises to 12° below the horizon",
            |observer, reference| {
                crossing(
                    observer,
                    reference,
                    SolarEvent::Dawn(DawnType::Nautical),
                    NAUTICAL_ELEVATION,
                )
            },
        ),
        EventDefinition::new(
            "dawnCivil",
            "Dawn (Civil)",
            "the Sun rises to 6° below the horizon",
            |observer, reference| {
                crossing(
                    observer,
                    reference,
                    SolarEvent::Dawn(DawnType::Civil),
                    CIVIL_ELEVATION,
                )
            },
        ),
        EventDefinition::new(
            "goldenHourRisingStart",
            "Golden Hour Start (Rising)",
            "the morning golden hour begins",
            |observer, reference| {
                elevation_crossing(observer, reference, GOLDEN_HOUR_LOWER_ELEVATION, true)
            },
        ),
        EventDefinition::new(
            "sunrise",
            "Sunrise",
            "the Sun appears on the horizon in the morning",
            |observer, reference| {
                crossing(observer, reference, SolarEvent::Sunrise, HORIZON_ELEVATION)
            },
        ),
        EventDefinition::new(
            "goldenHourRisingEnd",
            "Golden Hour End (Rising)",
            "the morning golden hour ends",
            |observer, reference| {
                elevation_crossing(observer, reference, GOLDEN_HOUR_UPPER_ELEVATION, true)
            },
        ),
        EventDefinition::new(
            "noon",
            "Noon",
            "the Sun crosses the local meridian",
            |observer, reference| solar_noon(observer, reference),
        ),
        EventDefinition::new(
            "goldenHourSettingStart",
            "Golden Hour Start (Setting)",
            "the evening golden hour begins",
            |observer, reference| {
                elevation_crossing(observer, reference, GOLDEN_HOUR_UPPER_ELEVATION, false)
            },
        ),
        EventDefinition::new(
            "sunset",
            "Sunset",
            "the Sun disappears below the horizon in the evening",
            |observer, reference| {
                crossing(observer, reference, SolarEvent::Sunset, HORIZON_ELEVATION)
            },
        ),
        EventDefinition::new(
            "goldenHourSettingEnd",
            "Golden Hour End (Setting)",
            "the evening golden hour ends",
            |observer, reference| {
                elevation_crossing(observer, reference, GOLDEN_HOUR_LOWER_ELEVATION, false)
            },
        ),
        EventDefinition::new(
            "duskCivil",
            "Dusk (Civil)",
            "the Sun sets to 6° below the horizon",
            |observer, reference| {
                crossing(
                    observer,
                    reference,
                    SolarEvent::Dusk(DawnType::Civil),
                    CIVIL_ELEVATION,
                )
            },
        ),
        EventDefinition::new(
            "duskNautical",
            "Dusk (Nautical)",
            "the Sun sets to 12° below the horizon",
            |observer, reference| {
                crossing(
                    observer,
                    reference,
                    SolarEvent::Dusk(DawnType::Nautical),
                    NAUTICAL_ELEVATION,
                )
            },
        ),
        EventDefinition::new(
            "duskAstronomical",
            "Dusk (Astronomical)",
            "the Sun sets to 18° below the horizon",
            |observer, reference| {
                crossing(
                    observer,
                    reference,
                    SolarEvent::Dusk(DawnType::Astronomical),
                    ASTRONOMICAL_ELEVATION,
                )
            },
        ),
        EventDefinition::new(
            "midnight",
            "Midnight",
            "the Sun crosses the local anti-meridian",
            |observer, reference| solar_midnight(observer, reference),
        ),
    ]
}

/// Time the sun crosses `elevation` degrees, rising when `morning`.
fn elevation_crossing(
    observer: &Observer,
    reference: DateTime<Tz>,
    elevation: f64,
    morning: bool,
) -> Result<DateTime<Tz>, ResolveError> {
    let event = SolarEvent::Elevation {
        elevation: elevation.to_radians(),
        morning,
    };
    crossing(observer, reference, event, elevation)
}

/// Solve `event` for the local day of `reference`.
///
/// `elevation` is the sun elevation in degrees the event corresponds to and
/// is only used to reject days on which it is never reached.
fn crossing(
    observer: &Observer,
    reference: DateTime<Tz>,
    event: SolarEvent,
    elevation: f64,
) -> Result<DateTime<Tz>, ResolveError> {
    let date = reference.date_naive();
    let coordinates = Coordinates::new(observer.latitude, observer.longitude).ok_or(
        ResolveError::InvalidCoordinates {
            latitude: observer.latitude,
            longitude: observer.longitude,
        },
    )?;

    if !reaches_elevation(observer.latitude, date, elevation) {
        return Err(ResolveError::NoOccurrence { elevation, date });
    }

    let instant = SolarDay::new(coordinates, date)
        .with_altitude(observer.elevation)
        .event_time(event);

    near_date(date, instant, reference.timezone())
}

/// Solar transit for the local day of `reference`.
pub fn solar_noon(
    observer: &Observer,
    reference: DateTime<Tz>,
) -> Result<DateTime<Tz>, ResolveError> {
    let date = reference.date_naive();
    let day_start = Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN));

    // Two passes: the equation of time barely moves within a day
    let mut minutes = 720.0 - 4.0 * observer.longitude;
    for _ in 0..2 {
        let t = julian_century(day_start, minutes);
        minutes = 720.0 - 4.0 * observer.longitude - equation_of_time(t);
    }

    let instant = day_start + Duration::milliseconds((minutes * 60_000.0).round() as i64);
    near_date(date, instant, reference.timezone())
}

/// Solar anti-transit preceding the solar noon of the local day of `reference`.
pub fn solar_midnight(
    observer: &Observer,
    reference: DateTime<Tz>,
) -> Result<DateTime<Tz>, ResolveError> {
    let noon = solar_noon(observer, reference)?;
    Ok(noon - Duration::hours(12))
}

/// Whether the sun reaches `elevation` degrees at `latitude` on `date`.
pub fn reaches_elevation(latitude: f64, date: NaiveDate, elevation: f64) -> bool {
    let day_start = Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN));
    let declination = sun_declination(julian_century(day_start, 720.0));

    let phi = latitude.to_radians();
    let cos_hour_angle = (elevation.to_radians().sin() - phi.sin() * declination.sin())
        / (phi.cos() * declination.cos());

    cos_hour_angle.is_finite() && cos_hour_angle.abs() <= 1.0
}

fn near_date(
    date: NaiveDate,
    instant: DateTime<Utc>,
    tz: Tz,
) -> Result<DateTime<Tz>, ResolveError> {
    let local = instant.with_timezone(&tz);
    if (local.date_naive() - date).num_days().abs() > 1 {
        return Err(ResolveError::OutOfRange { date, instant });
    }
    Ok(local)
}

/// Julian centuries since J2000 for `minutes` after `day_start` (UTC).
fn julian_century(day_start: DateTime<Utc>, minutes: f64) -> f64 {
    let unix_days = day_start.timestamp() as f64 / DAY_SECONDS as f64;
    let julian_day = UNIX_EPOCH_JULIAN_DAY + unix_days + minutes / 1440.0;
    (julian_day - J2000_JULIAN_DAY) / 36525.0
}

fn mean_longitude(t: f64) -> f64 {
    (280.46646 + t * (36000.76983 + t * 0.0003032)).rem_euclid(360.0)
}

fn mean_anomaly(t: f64) -> f64 {
    357.52911 + t * (35999.05029 - 0.0001537 * t)
}

fn eccentricity(t: f64) -> f64 {
    0.016708634 - t * (0.000042037 + 0.0000001267 * t)
}

fn obliquity(t: f64) -> f64 {
    let seconds = 21.448 - t * (46.815 + t * (0.00059 - t * 0.001813));
    let mean = 23.0 + (26.0 + seconds / 60.0) / 60.0;
    let omega = 125.04 - 1934.136 * t;
    mean + 0.00256 * omega.to_radians().cos()
}

/// Sun declination in radians.
fn sun_declination(t: f64) -> f64 {
    let m = mean_anomaly(t).to_radians();
    let center = m.sin() * (1.914602 - t * (0.004817 + 0.000014 * t))
        + (2.0 * m).sin() * (0.019993 - 0.000101 * t)
        + (3.0 * m).sin() * 0.000289;
    let true_longitude = mean_longitude(t) + center;
    let omega = 125.04 - 1934.136 * t;
    let apparent_longitude = true_longitude - 0.00569 - 0.00478 * omega.to_radians().sin();

    (obliquity(t).to_radians().sin() * apparent_longitude.to_radians().sin()).asin()
}

/// Equation of time in minutes.
fn equation_of_time(t: f64) -> f64 {
    let l0 = mean_longitude(t).to_radians();
    let m = mean_anomaly(t).to_radians();
    let e = eccentricity(t);
    let y = (obliquity(t).to_radians() / 2.0).tan().powi(2);

    let radians = y * (2.0 * l0).sin() - 2.0 * e * m.sin()
        + 4.0 * e * y * m.sin() * (2.0 * l0).cos()
        - 0.5 * y * y * (4.0 * l0).sin()
        - 1.25 * e * e * (2.0 * m).sin();

    4.0 * radians.to_degrees()
}
