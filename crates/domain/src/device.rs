//! Device: a physical or virtual thing published on the device bus.
//!
//! Rain sensors, window contacts and weather feeds are all devices. The
//! rain engine also publishes itself as one more device so other
//! collaborators can read its state.

mod attribute_value;
mod level;

pub use attribute_value::AttributeValue;
pub use level::Level;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{RainHubError, ValidationError};
use crate::id::DeviceId;

/// Broad device category, used to filter devices when scanning the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// On/off sensor (rain sensor, window contact, …).
    #[default]
    SensorBinary,
    /// Sensor exposing numeric or structured readings (weather feeds).
    SensorMultilevel,
    /// Actuator.
    Switch,
    /// Device synthesised by a module, such as the rain engine itself.
    Virtual,
}

/// A device snapshot as seen through the device bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub kind: DeviceKind,
    /// Type-specific marker; weather feeds announce their role here
    /// (see [`FeedRole`](crate::weather::FeedRole)).
    pub probe: Option<String>,
    /// Display name of the containing area, when known.
    pub area: Option<String>,
    pub level: Level,
    pub metrics: HashMap<String, AttributeValue>,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Look up a metric by key.
    #[must_use]
    pub fn metric(&self, key: &str) -> Option<&AttributeValue> {
        self.metrics.get(key)
    }

    /// Name for human-facing messages: `"Name (Area)"` when the area is known.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.area {
            Some(area) => format!("{} ({area})", self.name),
            None => self.name.clone(),
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RainHubError::Validation`] when the id or name is empty.
    pub fn validate(&self) -> Result<(), RainHubError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyDeviceId.into());
        }
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<DeviceId>,
    name: Option<String>,
    kind: DeviceKind,
    probe: Option<String>,
    area: Option<String>,
    level: Level,
    metrics: HashMap<String, AttributeValue>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<DeviceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: DeviceKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn probe(mut self, probe: impl Into<String>) -> Self {
        self.probe = Some(probe.into());
        self
    }

    #[must_use]
    pub fn area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }

    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn metric(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.metrics.insert(key.into(), value.into());
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// # Errors
    ///
    /// Returns [`RainHubError::Validation`] if `id` or `name` is missing or empty.
    pub fn build(self) -> Result<Device, RainHubError> {
        let device = Device {
            id: self.id.unwrap_or_else(|| DeviceId::new("")),
            name: self.name.unwrap_or_default(),
            kind: self.kind,
            probe: self.probe,
            area: self.area,
            level: self.level,
            metrics: self.metrics,
        };
        device.validate()?;
        Ok(device)
    }
}
