//! Configuration loading.
//!
//! Finds `ephemeris.toml`, parses it, and validates the result. A missing
//! file is an error: there is no sensible default location to track.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::{Config, Settings};
use crate::constants::*;

/// Path of `ephemeris.toml`, inside `config_dir` when given.
pub fn get_config_path(config_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = config_dir {
        return Ok(dir.join(CONFIG_FILE_NAME));
    }

    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load and validate the configuration for `config_dir` (or the default directory).
///
/// Returns the settings and the path they were read from.
pub fn load(config_dir: Option<&Path>) -> Result<(Settings, PathBuf)> {
    let path = get_config_path(config_dir)?;
    let settings = load_from_path(&path)
        .with_context(|| format!("Failed to load configuration from {}", private_path(&path)))?;
    Ok((settings, path))
}

/// Load and validate a specific file.
pub fn load_from_path(path: &Path) -> Result<Settings> {
    if !path.exists() {
        anyhow::bail!("Configuration file not found at {}", private_path(path));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", private_path(path)))?;

    config.resolve()
}

/// Path for display, with the home directory shortened to `~`.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(rest) = path.strip_prefix(&home)
    {
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}
