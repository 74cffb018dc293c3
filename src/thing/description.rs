//! Thing description: the declared properties and events of the service.
//!
//! For every registry key the thing exposes `today/<key>`, `next/<key>`, and
//! the event `<key>`. The description is what a transport layer would publish;
//! locally it gates which names the [`Thing`](super::Thing) accepts and is
//! printed by the `describe` command.

use serde::Serialize;

use crate::constants::*;
use crate::registry::Registry;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringSchema {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl StringSchema {
    fn hour() -> Self {
        Self {
            kind: "string",
            pattern: Some(HOUR_PATTERN.to_string()),
        }
    }

    fn timestamp() -> Self {
        Self {
            kind: "string",
            pattern: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyAffordance {
    pub name: String,
    pub title: String,
    pub description: String,
    pub read_only: bool,
    pub observable: bool,
    pub schema: StringSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventAffordance {
    pub name: String,
    pub title: String,
    pub description: String,
    pub data: StringSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThingDescription {
    pub id: String,
    pub version: String,
    pub title: String,
    pub description: String,
    pub properties: Vec<PropertyAffordance>,
    pub events: Vec<EventAffordance>,
}

impl ThingDescription {
    /// Describe one `today/`, one `next/` property and one event per key.
    pub fn from_registry(registry: &Registry) -> Self {
        let mut properties = Vec::with_capacity(registry.list().len() * 2);
        let mut events = Vec::with_capacity(registry.list().len());

        for definition in registry.list() {
            let key = definition.key.as_str();
            let name = &definition.display_name;
            let description = &definition.description;

            properties.push(PropertyAffordance {
                name: today_property(key),
                title: format!("Today {name} Hour"),
                description: format!("Today hour when {description}"),
                read_only: true,
                observable: true,
                schema: StringSchema::hour(),
            });
            properties.push(PropertyAffordance {
                name: next_property(key),
                title: format!("Next {name} Time"),
                description: format!("Next time when {description}"),
                read_only: true,
                observable: true,
                schema: StringSchema::timestamp(),
            });
            events.push(EventAffordance {
                name: key.to_string(),
                title: name.clone(),
                description: description.clone(),
                data: StringSchema::timestamp(),
            });
        }

        Self {
            id: THING_ID.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: THING_TITLE.to_string(),
            description: THING_DESCRIPTION.to_string(),
            properties,
            events,
        }
    }

    /// Adjust the `today/<key>` schema to the configured format.
    ///
    /// The hour pattern only describes the default `%H:%M` rendering; any
    /// other format publishes plain strings.
    pub fn with_today_format(mut self, format: &str) -> Self {
        let pattern = (format == DEFAULT_TODAY_FORMAT).then(|| HOUR_PATTERN.to_string());
        for property in &mut self.properties {
            if property.name.starts_with(TODAY_PROPERTY_PREFIX) {
                property.schema.pattern = pattern.clone();
            }
        }
        self
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.name == name)
    }

    pub fn has_event(&self, name: &str) -> bool {
        self.events.iter().any(|e| e.name == name)
    }
}

pub fn today_property(key: &str) -> String {
    format!("{TODAY_PROPERTY_PREFIX}{key}")
}

pub fn next_property(key: &str) -> String {
    format!("{NEXT_PROPERTY_PREFIX}{key}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Observer;

    fn registry() -> Registry {
        Registry::astral(
            Observer {
                latitude: 48.85,
                longitude: 2.35,
                elevation: 0.0,
            },
            chrono_tz::Europe::Paris,
        )
    }

    #[test]
    fn test_description_declares_every_key() {
        let registry = registry();
        let description = ThingDescription::from_registry(&registry);

        assert_eq!(description.properties.len(), 28);
        assert_eq!(description.events.len(), 14);
        for key in registry.keys() {
            assert!(description.has_property(&today_property(key.as_str())));
            assert!(description.has_property(&next_property(key.as_str())));
            assert!(description.has_event(key.as_str()));
        }
        assert!(!description.has_property("sunrise"));
        assert!(!description.has_event("today/sunrise"));
    }

    #[test]
    fn test_sunrise_titles() {
        let description = ThingDescription::from_registry(&registry());
        let today = description
            .properties
            .iter()
            .find(|p| p.name == "today/sunrise")
            .unwrap();

        assert_eq!(today.title, "Today Sunrise Hour");
        assert_eq!(
            today.description,
            "Today hour when the Sun appears on the horizon in the morning"
        );
        assert_eq!(today.schema.pattern.as_deref(), Some(HOUR_PATTERN));
    }

    #[test]
    fn test_custom_today_format_drops_hour_pattern() {
        let description =
            ThingDescription::from_registry(&registry()).with_today_format("%Y-%m-%d %H:%M");
        let today = description
            .properties
            .iter()
            .find(|p| p.name == "today/sunrise")
            .unwrap();
        assert_eq!(today.schema.pattern, None);

        let json = serde_json::to_value(&description).unwrap();
        assert!(json["properties"][0]["schema"].get("pattern").is_none());

        let default = ThingDescription::from_registry(&registry()).with_today_format("%H:%M");
        assert!(
            default
                .properties
                .iter()
                .filter(|p| p.name.starts_with(TODAY_PROPERTY_PREFIX))
                .all(|p| p.schema.pattern.as_deref() == Some(HOUR_PATTERN))
        );
    }

    #[test]
    fn test_description_serializes_to_json() {
        let json = serde_json::to_value(ThingDescription::from_registry(&registry())).unwrap();

        assert_eq!(json["id"], THING_ID);
        assert_eq!(json["properties"][0]["name"], "today/dawnAstronomical");
        assert_eq!(json["properties"][0]["readOnly"], true);
        assert_eq!(json["properties"][0]["schema"]["type"], "string");
        assert_eq!(json["events"][4]["name"], "sunrise");
    }
}
