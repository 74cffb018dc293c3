//! `today`: print today's occurrence of every event.
//!
//! Runs the same refresh the daemon runs at midnight and prints the resulting
//! `today/<key>` values. Events that do not occur today are shown as `--:--`.

use anyhow::Result;

use crate::logger::Log;
use crate::service::Service;
use crate::thing::{Sink, today_property};

pub fn handle_today_command(debug_enabled: bool, config_dir: Option<&str>) -> Result<()> {
    Log::set_debug(debug_enabled);
    log_version!();

    let settings = super::load_settings(config_dir)?;
    let service = Service::builder(settings).build();

    log_block_start!(
        "Today ({})",
        service
            .scheduler
            .now()
            .with_timezone(&service.scheduler.timezone())
            .format("%A %Y-%m-%d")
    );
    service.scheduler.refresh_today();

    let width = service
        .registry
        .list()
        .iter()
        .map(|d| d.display_name.chars().count())
        .max()
        .unwrap_or(0);

    for definition in service.registry.list() {
        let value = service
            .thing
            .get_property(&today_property(definition.key.as_str()))
            .unwrap_or_else(|| "--:--".to_string());
        log_indented!("{:<width$}  {}", definition.display_name, value);
    }

    log_end!();
    Ok(())
}
