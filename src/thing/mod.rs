//! Property and event sink.
//!
//! The scheduler only ever talks to the [`Sink`] trait: it overwrites
//! properties and emits events. [`Thing`] is the in-process implementation,
//! holding the current property values and fanning events out to subscribers
//! over channels.
//!
//! ## Module Structure
//!
//! - [`description`]: declared properties and events, derived from the registry
//! - [`events`]: the event record delivered to subscribers

pub mod description;
pub mod events;

use std::collections::{BTreeMap, HashMap};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::clock::Clock;
pub use description::{ThingDescription, next_property, today_property};
pub use events::ThingEvent;

/// Why a property write or event emission failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SinkError {
    #[error("property '{0}' is not declared")]
    UnknownProperty(String),

    #[error("event '{0}' is not declared")]
    UnknownEvent(String),

    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// Destination for property values and event notifications.
#[cfg_attr(test, mockall::automock)]
pub trait Sink: Send + Sync {
    /// Overwrite a property value. Last write wins.
    fn set_property(&self, name: &str, value: &str) -> Result<(), SinkError>;

    /// Notify subscribers without waiting for them.
    fn emit_event(&self, name: &str, payload: Option<String>) -> Result<(), SinkError>;

    fn get_property(&self, name: &str) -> Option<String>;
}

/// In-process thing: property store plus event fan-out.
pub struct Thing {
    description: ThingDescription,
    properties: RwLock<HashMap<String, String>>,
    subscribers: Mutex<Vec<Sender<ThingEvent>>>,
    clock: Arc<dyn Clock>,
}

impl Thing {
    pub fn new(description: ThingDescription, clock: Arc<dyn Clock>) -> Self {
        Self {
            description,
            properties: RwLock::new(HashMap::new()),
            subscribers: Mutex::new(Vec::new()),
            clock,
        }
    }

    pub fn description(&self) -> &ThingDescription {
        &self.description
    }

    /// Receive every event emitted from now on.
    pub fn subscribe(&self) -> Receiver<ThingEvent> {
        let (tx, rx) = channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Current property values, sorted by name.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.properties
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Sink for Thing {
    fn set_property(&self, name: &str, value: &str) -> Result<(), SinkError> {
        if !self.description.has_property(name) {
            return Err(SinkError::UnknownProperty(name.to_string()));
        }
        self.properties
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn emit_event(&self, name: &str, payload: Option<String>) -> Result<(), SinkError> {
        if !self.description.has_event(name) {
            return Err(SinkError::UnknownEvent(name.to_string()));
        }

        // Without an explicit payload, subscribers get the value of next/<name>
        // as it stands at emission time
        let payload = payload.or_else(|| {
            self.get_property(&next_property(name))
                .filter(|value| !value.is_empty())
        });
        let event = ThingEvent::new(name, payload, self.clock.now());

        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        Ok(())
    }

    fn get_property(&self, name: &str) -> Option<String> {
        self.properties
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}
