//! `describe`: print the thing description as JSON.
//!
//! Output is plain JSON on stdout so it can be piped; nothing else is logged.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config;
use crate::service::Service;

pub fn handle_describe_command(config_dir: Option<&str>) -> Result<()> {
    let (settings, _) = config::load(config_dir.map(Path::new))?;
    let service = Service::builder(settings).build();

    let json = serde_json::to_string_pretty(service.thing.description())
        .context("Failed to serialize thing description")?;
    println!("{json}");
    Ok(())
}
