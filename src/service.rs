//! Wiring of registry, thing and scheduler for one configuration.
//!
//! Every command builds the same object graph: a registry for the configured
//! observer and zone, a [`Thing`] described from it, and a scheduler writing to
//! that thing. `Service` is the assembled graph; the builder chooses the clock
//! and, in tests, replaces the event set.
//!
//! ```no_run
//! use ephemeris::config;
//! use ephemeris::service::Service;
//!
//! # fn main() -> anyhow::Result<()> {
//! let (settings, _) = config::load(None)?;
//! let service = Service::builder(settings).build();
//! service.scheduler.prime();
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::Settings;
use crate::registry::{EventDefinition, Registry};
use crate::scheduler::OccurrenceScheduler;
use crate::thing::{Thing, ThingDescription};

pub struct Service {
    pub settings: Settings,
    pub registry: Arc<Registry>,
    pub thing: Arc<Thing>,
    pub scheduler: Arc<OccurrenceScheduler>,
}

impl Service {
    pub fn builder(settings: Settings) -> ServiceBuilder {
        ServiceBuilder::new(settings)
    }
}

/// Builder for [`Service`].
pub struct ServiceBuilder {
    settings: Settings,
    clock: Arc<dyn Clock>,
    definitions: Option<Vec<EventDefinition>>,
}

impl ServiceBuilder {
    /// Wall-clock service tracking the standard solar events.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            clock: Arc::new(SystemClock),
            definitions: None,
        }
    }

    /// Use `clock` instead of wall time (simulation and tests).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Track `definitions` instead of the standard solar events.
    pub fn with_definitions(mut self, definitions: Vec<EventDefinition>) -> Self {
        self.definitions = Some(definitions);
        self
    }

    pub fn build(self) -> Service {
        let observer = self.settings.observer;
        let timezone = self.settings.timezone;
        let registry = Arc::new(match self.definitions {
            Some(definitions) => Registry::new(observer, timezone, definitions),
            None => Registry::astral(observer, timezone),
        });

        let thing = Arc::new(Thing::new(
            ThingDescription::from_registry(&registry)
                .with_today_format(&self.settings.formats.today),
            Arc::clone(&self.clock),
        ));

        let scheduler = Arc::new(OccurrenceScheduler::new(
            Arc::clone(&registry),
            Arc::clone(&thing) as Arc<dyn crate::thing::Sink>,
            self.clock,
            self.settings.formats.clone(),
            self.settings.lookahead_days,
        ));

        Service {
            settings: self.settings,
            registry,
            thing,
            scheduler,
        }
    }
}
