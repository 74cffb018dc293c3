//! `list`: print the schedule computed from the current time.

use anyhow::Result;

use crate::display::{format_until, schedule_line};
use crate::logger::Log;
use crate::service::Service;

pub fn handle_list_command(debug_enabled: bool, config_dir: Option<&str>) -> Result<()> {
    Log::set_debug(debug_enabled);
    log_version!();

    let settings = super::load_settings(config_dir)?;
    let service = Service::builder(settings).build();
    let scheduler = &service.scheduler;

    scheduler.init_all();
    let now = scheduler.now();
    let tz = scheduler.timezone();

    log_block_start!("Upcoming events");
    for entry in scheduler.list_scheduled() {
        log_indented!("{}  ({})", schedule_line(&entry, tz), format_until(entry.at, now));
    }

    scheduler.cancel_all();
    log_end!();
    Ok(())
}
