//! Occurrence function registry.
//!
//! Maps every tracked event key to its display name, description, and the
//! function that computes the event's instant for a given day at the
//! configured observer. The registry is built once at startup and never
//! mutated afterwards.
//!
//! ## Module Structure
//!
//! - [`solar`]: solar geometry and the standard dawn/sunrise/noon/sunset/dusk
//!   occurrence functions

pub mod solar;


use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;

/// Identifier of a tracked event, e.g. `sunrise` or `duskCivil`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EventKey(String);

impl EventKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Fixed geographic point occurrence functions are computed for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    /// Degrees, north positive
    pub latitude: f64,
    /// Degrees, east positive
    pub longitude: f64,
    /// Metres above sea level
    pub elevation: f64,
}

/// Why an occurrence could not be produced for a given day.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("unknown event key '{0}'")]
    UnknownKey(String),

    #[error("the sun does not cross {elevation}° on {date}")]
    NoOccurrence { elevation: f64, date: NaiveDate },

    #[error("solver returned {instant} which is not near {date}")]
    OutOfRange {
        date: NaiveDate,
        instant: DateTime<Utc>,
    },

    #[error("{0} does not exist in the configured timezone")]
    InvalidLocalTime(NaiveDateTime),

    #[error("invalid coordinates: {latitude}, {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}

/// Computes the instant of an event on the local day of the reference instant.
pub type OccurrenceFn =
    Box<dyn Fn(&Observer, DateTime<Tz>) -> Result<DateTime<Tz>, ResolveError> + Send + Sync>;

/// One tracked event.
pub struct EventDefinition {
    pub key: EventKey,
    pub display_name: String,
    pub description: String,
    occurrence: OccurrenceFn,
}

impl EventDefinition {
    pub fn new<F>(key: &str, display_name: &str, description: &str, occurrence: F) -> Self
    where
        F: Fn(&Observer, DateTime<Tz>) -> Result<DateTime<Tz>, ResolveError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            key: EventKey::new(key),
            display_name: display_name.to_string(),
            description: description.to_string(),
            occurrence: Box::new(occurrence),
        }
    }
}

impl fmt::Debug for EventDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDefinition")
            .field("key", &self.key)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

/// The fixed set of event definitions plus the observer and zone they share.
#[derive(Debug)]
pub struct Registry {
    observer: Observer,
    timezone: Tz,
    definitions: Vec<EventDefinition>,
}

impl Registry {
    pub fn new(observer: Observer, timezone: Tz, definitions: Vec<EventDefinition>) -> Self {
        Self {
            observer,
            timezone,
            definitions,
        }
    }

    /// Registry with the standard solar events, in their daily order.
    pub fn astral(observer: Observer, timezone: Tz) -> Self {
        Self::new(observer, timezone, solar::standard_definitions())
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Definitions in registration order.
    pub fn list(&self) -> &[EventDefinition] {
        &self.definitions
    }

    pub fn keys(&self) -> impl Iterator<Item = &EventKey> {
        self.definitions.iter().map(|d| &d.key)
    }

    pub fn get(&self, key: &str) -> Option<&EventDefinition> {
        self.definitions.iter().find(|d| d.key.as_str() == key)
    }

    /// Resolve `key` on the local calendar day of `reference`.
    pub fn resolve(
        &self,
        key: &str,
        reference: DateTime<Utc>,
    ) -> Result<DateTime<Tz>, ResolveError> {
        let definition = self
            .get(key)
            .ok_or_else(|| ResolveError::UnknownKey(key.to_string()))?;
        (definition.occurrence)(&self.observer, reference.with_timezone(&self.timezone))
    }
}
