//! Command-line command handlers.
//!
//! Each command is implemented in its own submodule. All of them start from the
//! same validated [`Settings`](crate::config::Settings) and the same
//! [`Service`](crate::service::Service) wiring; they differ in the clock they
//! use and in how long they keep the scheduler running.

pub mod describe;
pub mod list;
pub mod run;
pub mod simulate;
pub mod today;

use anyhow::Result;
use std::path::Path;

use crate::config::{self, Settings, loading::private_path};

/// Load the configuration for `config_dir` and log where it came from.
pub(crate) fn load_settings(config_dir: Option<&str>) -> Result<Settings> {
    let (settings, path) = config::load(config_dir.map(Path::new))?;
    settings.log_config(&private_path(&path));
    Ok(settings)
}
