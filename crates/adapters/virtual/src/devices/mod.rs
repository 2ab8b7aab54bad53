//! Virtual device descriptions: rain sensors, openings and weather feeds.
//!
//! Each description is deserialized from a `[[devices]]` table and turned
//! into a bus [`Device`] by [`VirtualDeviceConfig::discover`].

mod opening;
mod rain_sensor;
mod weather_feed;

pub use opening::OpeningConfig;
pub use rain_sensor::RainSensorConfig;
pub use weather_feed::WeatherFeedConfig;

use serde::{Deserialize, Serialize};

use rainhub_domain::device::Device;
use rainhub_domain::error::RainHubError;

/// One simulated device, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VirtualDeviceConfig {
    RainSensor(RainSensorConfig),
    Opening(OpeningConfig),
    Weather(WeatherFeedConfig),
}

impl VirtualDeviceConfig {
    /// Produce the [`Device`] registered on the bus.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the id or name is empty.
    pub fn discover(&self) -> Result<Device, RainHubError> {
        match self {
            Self::RainSensor(config) => config.discover(),
            Self::Opening(config) => config.discover(),
            Self::Weather(config) => config.discover(),
        }
    }
}
