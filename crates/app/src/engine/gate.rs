//! Notification gate: warn when rain starts while openings are open.

use rainhub_domain::config::RainConfig;
use rainhub_domain::event::{Event, EventType};
use rainhub_domain::id::DeviceId;
use rainhub_domain::notification::Notification;

use crate::ports::DeviceBus;

/// Side effects raised when rain starts with openings open.
#[derive(Debug, Clone, PartialEq)]
pub struct Alarm {
    pub notification: Notification,
    pub event: Event,
}

pub struct NotificationGate {
    engine: DeviceId,
    title: String,
    location: Option<String>,
    openings: Vec<DeviceId>,
}

impl NotificationGate {
    #[must_use]
    pub fn from_config(config: &RainConfig) -> Self {
        Self {
            engine: config.id.clone(),
            title: config.name.clone(),
            location: config.location.clone(),
            openings: config.openings.clone(),
        }
    }

    /// Look up every configured opening and raise an alarm if any is open.
    pub async fn inspect<B: DeviceBus>(&self, bus: &B) -> Option<Alarm> {
        let mut open = Vec::new();
        for id in &self.openings {
            match bus.get(id).await {
                Ok(device) if device.level.is_on() => open.push(device.display_name()),
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(device = %id, error = %err, "opening not resolvable, skipping");
                }
            }
        }
        self.alarm(&open)
    }

    /// Build the alarm for the given open openings, `None` when all are closed.
    #[must_use]
    pub fn alarm(&self, open: &[String]) -> Option<Alarm> {
        if open.is_empty() {
            return None;
        }
        let message = format!("Rain detected while open: {}", open.join(", "));
        let notification =
            Notification::warning(self.engine.clone(), self.title.clone(), message.clone());
        let event = Event::new(
            EventType::SecurityRainAlarm,
            Some(self.engine.clone()),
            serde_json::json!({
                "id": self.engine,
                "title": self.title,
                "location": self.location,
                "message": message,
            }),
        );
        Some(Alarm {
            notification,
            event,
        })
    }
}
