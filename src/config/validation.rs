//! Configuration validation.
//!
//! Rejects configurations the scheduler cannot run with: missing observer
//! fields, coordinates out of range, unknown zones, format strings chrono
//! cannot render, and look-ahead bounds outside the supported range.

use anyhow::Result;

use super::{Config, parse_location};
use crate::constants::*;
use crate::display::is_valid_format;

pub fn validate_config(config: &Config) -> Result<()> {
    let Some(lat) = config.latitude else {
        anyhow::bail!("latitude is required");
    };
    let Some(lon) = config.longitude else {
        anyhow::bail!("longitude is required");
    };
    let Some(location) = config.location.as_deref() else {
        anyhow::bail!("location is required (an IANA zone name such as \"Europe/Paris\")");
    };

    if !(-90.0..=90.0).contains(&lat) {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if !(-180.0..=180.0).contains(&lon) {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    parse_location(location)?;

    if let Some(elevation) = config.elevation
        && !elevation.is_finite()
    {
        anyhow::bail!("elevation must be a finite number of metres (got {})", elevation);
    }

    validate_format("today_format", config.today_format.as_deref())?;
    validate_format("next_format", config.next_format.as_deref())?;

    if let Some(days) = config.lookahead_days
        && !(MINIMUM_LOOKAHEAD_DAYS..=MAXIMUM_LOOKAHEAD_DAYS).contains(&days)
    {
        anyhow::bail!(
            "lookahead_days ({}) must be between {} and {} days",
            days,
            MINIMUM_LOOKAHEAD_DAYS,
            MAXIMUM_LOOKAHEAD_DAYS
        );
    }

    Ok(())
}

fn validate_format(field: &str, format: Option<&str>) -> Result<()> {
    if let Some(format) = format
        && !is_valid_format(format)
    {
        anyhow::bail!("{field} \"{format}\" is not a valid chrono format string");
    }
    Ok(())
}
