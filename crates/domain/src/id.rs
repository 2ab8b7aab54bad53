//! Identifiers: UUID-backed event ids, string-backed device ids, and the
//! qualified source tags recorded in a verdict.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for an [`Event`](crate::event::Event).
    EventId
);

/// Identifier of a device on the device bus (e.g. `"rain_sensor_1"`).
///
/// Device ids are assigned by the bus, not by rainhub, so they are opaque
/// strings rather than UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Fully qualified reference to the field that made a rule fire:
/// the binding's device id plus the field name, rendered `device:field`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SourceTag {
    pub device: DeviceId,
    pub field: String,
}

impl SourceTag {
    #[must_use]
    pub fn new(device: DeviceId, field: impl Into<String>) -> Self {
        Self {
            device,
            field: field.into(),
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.device, self.field)
    }
}

impl From<SourceTag> for String {
    fn from(tag: SourceTag) -> Self {
        tag.to_string()
    }
}

/// Error returned when a string is not of the form `device:field`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid source tag {0:?}, expected `device:field`")]
pub struct InvalidSourceTag(String);

impl TryFrom<String> for SourceTag {
    type Error = InvalidSourceTag;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for SourceTag {
    type Err = InvalidSourceTag;

    // Device ids may themselves contain `:`, the field never does.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once(':') {
            Some((device, field)) if !device.is_empty() && !field.is_empty() => {
                Ok(Self::new(DeviceId::from(device), field))
            }
            _ => Err(InvalidSourceTag(s.to_string())),
        }
    }
}
