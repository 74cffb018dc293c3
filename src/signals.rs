//! Shutdown signal handling.
//!
//! SIGINT, SIGTERM and SIGHUP all request a clean shutdown. A dedicated thread
//! iterates `signal-hook`'s [`Signals`], clears the shared running flag and
//! forwards a [`SignalMessage`] to the main thread, which blocks on the
//! receiving end while the dispatcher does the work.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM},
    iterator::Signals,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::Arc;
use std::thread;

/// Messages sent from the signal thread to the main thread.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalMessage {
    /// Stop dispatching and exit; carries the signal name for logging
    Shutdown { signal: &'static str },
}

/// Signal handling state shared between threads.
pub struct SignalState {
    /// Cleared once a shutdown has been requested
    pub running: Arc<AtomicBool>,
    pub signal_receiver: Receiver<SignalMessage>,
    pub signal_sender: Sender<SignalMessage>,
}

impl SignalState {
    /// State with no OS handlers attached.
    pub fn new() -> Self {
        let (signal_sender, signal_receiver) = channel();
        Self {
            running: Arc::new(AtomicBool::new(true)),
            signal_receiver,
            signal_sender,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Request shutdown as if `signal` had been received.
    pub fn request_shutdown(&self, signal: &'static str) {
        request_shutdown(&self.running, &self.signal_sender, signal);
    }

    /// Block until a shutdown is requested. Returns the triggering signal name.
    pub fn wait_for_shutdown(&self) -> &'static str {
        match self.signal_receiver.recv() {
            Ok(SignalMessage::Shutdown { signal }) => signal,
            // Every sender is gone; nothing can ask us to keep running
            Err(_) => "disconnected",
        }
    }
}

impl Default for SignalState {
    fn default() -> Self {
        Self::new()
    }
}

/// Register SIGINT, SIGTERM and SIGHUP and start the signal thread.
pub fn setup_signal_handler() -> Result<SignalState> {
    let state = SignalState::new();

    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("failed to register signal handlers")?;

    let running = Arc::clone(&state.running);
    let sender = state.signal_sender.clone();

    thread::Builder::new()
        .name("ephemeris-signals".to_string())
        .spawn(move || {
            for sig in signals.forever() {
                let name = match sig {
                    SIGINT => "SIGINT",
                    SIGTERM => "SIGTERM",
                    SIGHUP => "SIGHUP",
                    _ => continue,
                };

                log_pipe!();
                log_info!("Received {}, shutting down", name);
                if !request_shutdown(&running, &sender, name) {
                    break;
                }
            }
        })
        .context("failed to spawn signal handler thread")?;

    log_debug!("Signal handlers registered for SIGINT, SIGTERM and SIGHUP");
    Ok(state)
}

// Returns false once the main thread has stopped listening
fn request_shutdown(
    running: &AtomicBool,
    sender: &Sender<SignalMessage>,
    signal: &'static str,
) -> bool {
    running.store(false, Ordering::SeqCst);
    sender.send(SignalMessage::Shutdown { signal }).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shutdown_clears_running_and_notifies() {
        let state = SignalState::new();
        assert!(state.is_running());

        state.request_shutdown("SIGTERM");

        assert!(!state.is_running());
        assert_eq!(state.wait_for_shutdown(), "SIGTERM");
    }

    #[test]
    fn test_shutdown_from_another_thread() {
        let state = SignalState::new();
        let running = Arc::clone(&state.running);
        let sender = state.signal_sender.clone();

        let handle = thread::spawn(move || request_shutdown(&running, &sender, "SIGINT"));

        assert_eq!(state.wait_for_shutdown(), "SIGINT");
        assert!(handle.join().unwrap());
        assert!(!state.is_running());
    }
}
