//! `simulate`: replay a time range against a manual clock.
//!
//! The clock jumps straight from one timer deadline to the next, so days of
//! events replay instantly. Every log line is prefixed with the simulated
//! local time, and with `--log` the output goes to a file instead of stdout.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::clock::{ManualClock, parse_datetime_in_tz};
use crate::constants::SIMULATION_LOG_FILE;
use crate::logger::Log;
use crate::scheduler::OccurrenceScheduler;
use crate::service::Service;
use crate::thing::ThingEvent;
use crate::timer::TimerId;

/// What a fast-forward run did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SimulationSummary {
    /// Event emissions per key
    pub events: BTreeMap<String, usize>,
    /// Daily refresh runs
    pub refreshes: usize,
}

impl SimulationSummary {
    pub fn total_events(&self) -> usize {
        self.events.values().sum()
    }
}

pub fn handle_simulate_command(
    debug_enabled: bool,
    start_time: &str,
    end_time: &str,
    log_to_file: bool,
    config_dir: Option<&str>,
) -> Result<()> {
    Log::set_debug(debug_enabled);

    // Quietly resolve the zone first: the start time is local to it
    let (settings, _) = crate::config::load(config_dir.map(std::path::Path::new))?;
    let tz = settings.timezone;

    let start = parse_datetime_in_tz(start_time, tz)
        .map_err(|e| anyhow::anyhow!("Invalid start time: {}", e))?
        .with_timezone(&Utc);
    let end = parse_datetime_in_tz(end_time, tz)
        .map_err(|e| anyhow::anyhow!("Invalid end time: {}", e))?
        .with_timezone(&Utc);

    if end <= start {
        anyhow::bail!("End time must be after start time");
    }

    let clock = Arc::new(ManualClock::new(start));
    Log::set_simulation_clock(clock.clone(), tz);

    let _log_guard = if log_to_file {
        let guard = Log::start_file_logging(SIMULATION_LOG_FILE.to_string())
            .context("Failed to start simulation log file")?;
        println!("Writing simulation output to {SIMULATION_LOG_FILE}");
        Some(guard)
    } else {
        None
    };

    log_version!();
    log_block_start!("Simulation Mode");
    let duration = end - start;
    log_decorated!(
        "Simulating from {} to {}",
        start.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S"),
        end.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S")
    );
    log_indented!(
        "Total simulated time: {} days {} hours",
        duration.num_days(),
        duration.num_hours() % 24
    );

    let service = Service::builder(settings)
        .with_clock(clock.clone())
        .build();
    let events = service.thing.subscribe();

    service.scheduler.prime();
    let mut summary = fast_forward(&service.scheduler, &clock, end);
    for event in events.try_iter() {
        record_event(&mut summary, event);
    }

    log_block_start!("Simulation complete");
    log_decorated!(
        "{} events fired, {} daily refreshes",
        summary.total_events(),
        summary.refreshes
    );
    for (key, count) in &summary.events {
        log_indented!("{}: {}", key, count);
    }

    service.scheduler.cancel_all();
    log_end!();
    Ok(())
}

/// Fire every timer due up to and including `end`, moving `clock` to each
/// deadline first. Leaves the clock at `end`.
///
/// Event emissions are not counted here since they are only visible to sink
/// subscribers; the returned summary carries refresh runs only.
pub fn fast_forward(
    scheduler: &OccurrenceScheduler,
    clock: &ManualClock,
    end: DateTime<Utc>,
) -> SimulationSummary {
    let mut summary = SimulationSummary::default();

    while let Some(deadline) = scheduler.next_deadline() {
        if deadline > end {
            break;
        }
        clock.set(deadline);
        for fired in scheduler.run_due(deadline) {
            if fired.id == TimerId::DailyRefresh {
                summary.refreshes += 1;
            }
        }
    }

    clock.set(end);
    summary
}

fn record_event(summary: &mut SimulationSummary, event: ThingEvent) {
    *summary.events.entry(event.name).or_default() += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::config::Settings;
    use crate::display::TimestampFormats;
    use crate::registry::Observer;
    use chrono::TimeZone;

    #[test]
    fn test_fast_forward_one_day_in_paris() {
        let settings = Settings {
            observer: Observer {
                latitude: 48.85,
                longitude: 2.35,
                elevation: 0.0,
            },
            timezone: chrono_tz::Europe::Paris,
            formats: TimestampFormats::default(),
            lookahead_days: 30,
        };
        let start = Utc.with_ymd_and_hms(2024, 3, 10, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 11, 10, 0, 0).unwrap();

        let clock = Arc::new(ManualClock::new(start));
        let service = Service::builder(settings).with_clock(clock.clone()).build();
        let events = service.thing.subscribe();

        service.scheduler.prime();
        let mut summary = fast_forward(&service.scheduler, &clock, end);
        for event in events.try_iter() {
            record_event(&mut summary, event);
        }

        assert_eq!(summary.refreshes, 1);
        assert_eq!(summary.events.len(), 14);
        assert_eq!(summary.total_events(), 14);
        assert_eq!(clock.now(), end);
        assert!(service.scheduler.list_scheduled().iter().all(|e| e.at > end));
    }
}
