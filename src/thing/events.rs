//! Event notifications delivered to thing subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One emitted event as seen by a subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThingEvent {
    /// Event name, the tracked key (e.g. `sunrise`)
    pub name: String,
    /// Formatted instant that just elapsed, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    /// Wall time the emission happened
    pub emitted_at: DateTime<Utc>,
}

impl ThingEvent {
    pub fn new(name: &str, payload: Option<String>, emitted_at: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            payload,
            emitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_serialization() {
        let at = Utc.with_ymd_and_hms(2024, 6, 2, 3, 48, 0).unwrap();
        let event = ThingEvent::new("sunrise", Some("2024-06-02 05:48".to_string()), at);
        let json = serde_json::to_string(&event).unwrap();

        assert!(json.contains("\"name\":\"sunrise\""));
        assert!(json.contains("\"payload\":\"2024-06-02 05:48\""));
        assert!(json.contains("\"emitted_at\":\"2024-06-02T03:48:00Z\""));

        let without_payload = ThingEvent::new("noon", None, at);
        let json = serde_json::to_string(&without_payload).unwrap();
        assert!(!json.contains("payload"));
    }
}
