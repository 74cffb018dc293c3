//! Configuration for the ephemeris daemon.
//!
//! Settings live in `ephemeris.toml`, looked up in the directory given with
//! `--config`, otherwise in `$XDG_CONFIG_HOME/ephemeris/`:
//!
//! ```toml
//! latitude = 48.85                 # Observer latitude (-90 to +90)
//! longitude = 2.35                 # Observer longitude (-180 to +180)
//! location = "Europe/Paris"        # IANA zone the days and formats use
//! elevation = 0.0                  # Metres above sea level (optional)
//! today_format = "%H:%M"           # chrono format of today/<key> (optional)
//! next_format = "%Y-%m-%d %H:%M"   # chrono format of next/<key> (optional)
//! lookahead_days = 30              # Days searched before probing (1-366, optional)
//! ```
//!
//! The coordinates and the location are required. Loading fails when they are
//! missing, out of range, or when the zone is unknown; the daemon never starts
//! on a partial configuration.

pub mod loading;
pub mod validation;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::constants::*;
use crate::display::TimestampFormats;
use crate::registry::Observer;

pub use loading::{get_config_path, load, load_from_path};

/// Raw contents of `ephemeris.toml`.
///
/// Every field is optional at the parsing stage so that missing required
/// fields produce a readable error from validation instead of a serde one.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Observer latitude in degrees, north positive
    pub latitude: Option<f64>,
    /// Observer longitude in degrees, east positive
    pub longitude: Option<f64>,
    /// IANA timezone name, e.g. "Europe/Paris"
    pub location: Option<String>,
    /// Observer elevation in metres
    pub elevation: Option<f64>,
    pub today_format: Option<String>,
    pub next_format: Option<String>,
    /// How many days ahead to search before arming a daily probe
    pub lookahead_days: Option<u32>,
}

/// Validated configuration with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub observer: Observer,
    pub timezone: Tz,
    pub formats: TimestampFormats,
    pub lookahead_days: u32,
}

impl Config {
    /// Validate and apply defaults.
    pub fn resolve(&self) -> Result<Settings> {
        validation::validate_config(self)?;

        let (Some(latitude), Some(longitude), Some(location)) =
            (self.latitude, self.longitude, self.location.as_deref())
        else {
            anyhow::bail!("latitude, longitude and location are required");
        };

        let timezone = parse_location(location)?;

        Ok(Settings {
            observer: Observer {
                latitude,
                longitude,
                elevation: self.elevation.unwrap_or(DEFAULT_ELEVATION),
            },
            timezone,
            formats: TimestampFormats {
                today: self
                    .today_format
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TODAY_FORMAT.to_string()),
                next: self
                    .next_format
                    .clone()
                    .unwrap_or_else(|| DEFAULT_NEXT_FORMAT.to_string()),
            },
            lookahead_days: self.lookahead_days.unwrap_or(DEFAULT_LOOKAHEAD_DAYS),
        })
    }
}

impl Settings {
    pub fn log_config(&self, source: &str) {
        let lat_dir = if self.observer.latitude >= 0.0 { "N" } else { "S" };
        let lon_dir = if self.observer.longitude >= 0.0 { "E" } else { "W" };

        log_block_start!("Loaded configuration from {}", source);
        log_indented!(
            "Location: {:.3}°{}, {:.3}°{} ({})",
            self.observer.latitude.abs(),
            lat_dir,
            self.observer.longitude.abs(),
            lon_dir,
            self.timezone
        );
        if self.observer.elevation != 0.0 {
            log_indented!("Elevation: {} m", self.observer.elevation);
        }
        log_indented!(
            "Formats: today \"{}\", next \"{}\"",
            self.formats.today,
            self.formats.next
        );
        log_indented!("Look-ahead: {} days", self.lookahead_days);
    }
}

/// Parse an IANA zone name.
pub fn parse_location(location: &str) -> Result<Tz> {
    location
        .parse::<Tz>()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Unknown location '{location}', expected an IANA zone name"))
}
