//! Virtual binary rain sensor.

use serde::{Deserialize, Serialize};

use rainhub_domain::device::{Device, DeviceKind, Level};
use rainhub_domain::error::RainHubError;
use rainhub_domain::id::DeviceId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RainSensorConfig {
    pub id: DeviceId,
    pub name: String,
    #[serde(default)]
    pub area: Option<String>,
    /// Whether the sensor starts out wet.
    #[serde(default)]
    pub on: bool,
}

impl RainSensorConfig {
    /// # Errors
    ///
    /// Returns a validation error if the id or name is empty.
    pub fn discover(&self) -> Result<Device, RainHubError> {
        let mut builder = Device::builder()
            .id(self.id.clone())
            .name(self.name.clone())
            .kind(DeviceKind::SensorBinary)
            .probe("rain_sensor")
            .level(Level::from(self.on));
        if let Some(area) = &self.area {
            builder = builder.area(area.clone());
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_dry() {
        let config = RainSensorConfig {
            id: DeviceId::from("s1"),
            name: "Roof".to_string(),
            area: None,
            on: false,
        };
        let device = config.discover().unwrap();
        assert_eq!(device.level, Level::Off);
        assert_eq!(device.kind, DeviceKind::SensorBinary);
    }

    #[test]
    fn should_reject_empty_name() {
        let config = RainSensorConfig {
            id: DeviceId::from("s1"),
            name: String::new(),
            area: None,
            on: true,
        };
        assert!(config.discover().is_err());
    }
}
