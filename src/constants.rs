//! Application-wide constants and defaults.

// # Configuration
pub const CONFIG_DIR_NAME: &str = "ephemeris";
pub const CONFIG_FILE_NAME: &str = "ephemeris.toml";

pub const DEFAULT_ELEVATION: f64 = 0.0;
pub const DEFAULT_TODAY_FORMAT: &str = "%H:%M";
pub const DEFAULT_NEXT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Days to look ahead for a resolvable occurrence before falling back to a daily probe.
pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 30;
pub const MINIMUM_LOOKAHEAD_DAYS: u32 = 1;
pub const MAXIMUM_LOOKAHEAD_DAYS: u32 = 366;

// # Scheduling
/// Seconds in a day without DST shifts.
pub const DAY_SECONDS: i64 = 24 * 60 * 60;

/// Upper bound on a single dispatcher wait, so wall-clock jumps and
/// suspend/resume are noticed within a minute.
pub const MAX_DISPATCH_WAIT_SECS: u64 = 60;

// # Solar geometry (degrees)
pub const GOLDEN_HOUR_LOWER_ELEVATION: f64 = -4.0;
pub const GOLDEN_HOUR_UPPER_ELEVATION: f64 = 6.0;
pub const HORIZON_ELEVATION: f64 = -0.833;
pub const CIVIL_ELEVATION: f64 = -6.0;
pub const NAUTICAL_ELEVATION: f64 = -12.0;
pub const ASTRONOMICAL_ELEVATION: f64 = -18.0;

// # Thing model
pub const THING_ID: &str = "eria:service:astral:1";
pub const THING_TITLE: &str = "Astral";
pub const THING_DESCRIPTION: &str = "Calculations for the position of the sun";
pub const TODAY_PROPERTY_PREFIX: &str = "today/";
pub const NEXT_PROPERTY_PREFIX: &str = "next/";
pub const HOUR_PATTERN: &str = "[0-1]{1}[0-9]{1}:[0-5]{1}[0-9]{1}";

// # Simulation
pub const SIMULATION_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const SIMULATION_LOG_FILE: &str = "ephemeris-simulation.log";

// # Exit codes
pub const EXIT_FAILURE: i32 = 1;
