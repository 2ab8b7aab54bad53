//! Event: an immutable record of something the rain engine did.
//!
//! Events are fire-and-forget: they are published on the event bus and
//! never read back by the engine.

use serde::{Deserialize, Serialize};

use crate::id::{DeviceId, EventId};
use crate::time::{Timestamp, now};

/// Kind of domain event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    /// Rain level went from off to on.
    RainStart,
    /// Rain level went from on to off.
    RainStop,
    /// Rain started while at least one opening was open.
    SecurityRainAlarm,
}

impl EventType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RainStart => "rain-start",
            Self::RainStop => "rain-stop",
            Self::SecurityRainAlarm => "security-rain-alarm",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    /// Device that emitted the event (the engine's own device).
    pub source: Option<DeviceId>,
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(event_type: EventType, source: Option<DeviceId>, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            source,
            data,
            timestamp: now(),
        }
    }

    /// Override the timestamp, for callers holding their own clock.
    #[must_use]
    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_event_type_as_kebab_case() {
        let json = serde_json::to_value(EventType::SecurityRainAlarm).unwrap();
        assert_eq!(json, serde_json::json!("security-rain-alarm"));
        assert_eq!(EventType::RainStart.to_string(), "rain-start");
    }

    #[test]
    fn should_generate_distinct_ids() {
        let a = Event::new(EventType::RainStart, None, serde_json::Value::Null);
        let b = Event::new(EventType::RainStart, None, serde_json::Value::Null);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn should_override_timestamp() {
        let ts = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let event = Event::new(
            EventType::RainStop,
            Some(DeviceId::from("rain")),
            serde_json::json!({}),
        )
        .at(ts);
        assert_eq!(event.timestamp, ts);
        assert_eq!(event.source, Some(DeviceId::from("rain")));
    }
}
