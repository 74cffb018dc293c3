//! # Ephemeris Library
//!
//! Internal library for the ephemeris binary application.
//!
//! This library exists to enable testing of the scheduling internals and to
//! keep CLI dispatch (main.rs) separate from application logic.
//!
//! ## Architecture
//!
//! - **Registry**: `registry` maps each tracked event key to the function that
//!   computes its instant for a given local day (solar geometry in
//!   `registry::solar`)
//! - **Scheduling**: `timer` holds one-shot timers keyed by instant; `scheduler`
//!   arms one timer per key, re-arms it from its own callback, and refreshes
//!   the day's values at local midnight; `scheduler::executor` dispatches on
//!   threads
//! - **Thing**: `thing` is the property/event sink the scheduler writes to
//! - **Wiring**: `service` assembles registry, thing and scheduler for one
//!   configuration
//! - **Infrastructure**: `config`, `args`, `commands`, `signals`, `clock`,
//!   `display`, `logger`

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod clock;
pub mod commands;
pub mod config;
pub mod constants;
pub mod display;
pub mod registry;
pub mod scheduler;
pub mod service;
pub mod signals;
pub mod thing;
pub mod timer;

pub use registry::{EventKey, Observer, Registry};
pub use scheduler::OccurrenceScheduler;
pub use service::Service;
