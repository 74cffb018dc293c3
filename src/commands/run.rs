//! The daemon: schedule every event and dispatch until a shutdown signal.

use anyhow::Result;

use crate::display;
use crate::logger::Log;
use crate::scheduler::ExecutorHandle;
use crate::service::Service;
use crate::signals::setup_signal_handler;

pub fn handle_run_command(debug_enabled: bool, config_dir: Option<&str>) -> Result<()> {
    Log::set_debug(debug_enabled);
    log_version!();

    let settings = super::load_settings(config_dir)?;
    let signal_state = setup_signal_handler()?;

    let service = Service::builder(settings).build();
    let scheduler = &service.scheduler;

    log_block_start!("Scheduling {} events", service.registry.list().len());
    scheduler.prime();
    display::log_schedule(&scheduler.list_scheduled(), scheduler.timezone());

    let executor = ExecutorHandle::start(std::sync::Arc::clone(scheduler))?;
    log_block_start!("Waiting for the next event");

    let signal = signal_state.wait_for_shutdown();
    log_debug!("Shutdown requested by {}", signal);

    executor.shutdown();
    log_block_start!("Stopped");
    log_end!();
    Ok(())
}
