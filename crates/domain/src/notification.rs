//! Notification: a user-facing message delivered through the notifier port.

use serde::{Deserialize, Serialize};

use crate::id::DeviceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub source: DeviceId,
    pub title: String,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn warning(
        source: DeviceId,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level: NotificationLevel::Warning,
            source,
            title: title.into(),
            message: message.into(),
        }
    }
}
