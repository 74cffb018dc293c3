//! Threaded timer dispatch.
//!
//! A single dispatcher thread waits for the earliest armed timer and hands
//! every due timer to its own short-lived worker thread, so a callback that
//! blocks on the sink never delays other keys. Callbacks for one key are never
//! concurrent: a timer is re-armed only from inside its own callback.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use super::OccurrenceScheduler;
use crate::timer::{DueTimer, TimerId};

type InFlight = Arc<Mutex<Vec<JoinHandle<()>>>>;

/// Running dispatcher. Dropping it shuts it down.
pub struct ExecutorHandle {
    scheduler: Arc<OccurrenceScheduler>,
    running: Arc<AtomicBool>,
    dispatcher: Option<JoinHandle<()>>,
    in_flight: InFlight,
}

impl ExecutorHandle {
    /// Spawn the dispatcher thread for `scheduler`.
    ///
    /// Timers must be armed separately, e.g. with
    /// [`OccurrenceScheduler::prime`].
    pub fn start(scheduler: Arc<OccurrenceScheduler>) -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let in_flight: InFlight = Arc::new(Mutex::new(Vec::new()));

        let dispatcher = {
            let scheduler = Arc::clone(&scheduler);
            let running = Arc::clone(&running);
            let in_flight = Arc::clone(&in_flight);
            thread::Builder::new()
                .name("ephemeris-dispatch".to_string())
                .spawn(move || dispatch_loop(scheduler, running, in_flight))
                .context("Failed to spawn dispatcher thread")?
        };

        log_debug!("Dispatcher started");
        Ok(Self {
            scheduler,
            running,
            dispatcher: Some(dispatcher),
            in_flight,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop dispatching, wait for callbacks already running, then cancel every
    /// timer. No new timer fires once this returns.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(dispatcher) = self.dispatcher.take() else {
            return;
        };

        self.running.store(false, Ordering::SeqCst);
        self.scheduler.wake();
        if dispatcher.join().is_err() {
            log_error!("Dispatcher thread panicked");
        }

        let workers: Vec<JoinHandle<()>> = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for worker in workers {
            if worker.join().is_err() {
                log_error!("Timer callback panicked");
            }
        }

        self.scheduler.cancel_all();
        log_debug!("Dispatcher stopped");
    }
}

impl Drop for ExecutorHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn dispatch_loop(
    scheduler: Arc<OccurrenceScheduler>,
    running: Arc<AtomicBool>,
    in_flight: InFlight,
) {
    while running.load(Ordering::SeqCst) {
        let due = scheduler.wait_due(&running);
        if due.is_empty() {
            continue;
        }

        let mut workers = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        workers.retain(|worker| !worker.is_finished());

        for timer in due {
            match spawn_callback(&scheduler, timer.clone()) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    log_warning!("{e:#}; running callback on the dispatcher");
                    scheduler.dispatch(timer);
                }
            }
        }
    }
}

fn spawn_callback(
    scheduler: &Arc<OccurrenceScheduler>,
    timer: DueTimer,
) -> Result<JoinHandle<()>> {
    let name = match &timer.id {
        TimerId::Event(key) => format!("ephemeris-{key}"),
        TimerId::DailyRefresh => "ephemeris-refresh".to_string(),
    };
    let scheduler = Arc::clone(scheduler);

    thread::Builder::new()
        .name(name.clone())
        .spawn(move || scheduler.dispatch(timer))
        .with_context(|| format!("Failed to spawn {name}"))
}
