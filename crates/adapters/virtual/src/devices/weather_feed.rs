//! Virtual weather feed: a multilevel sensor announcing its role through
//! the probe marker, with free-form metrics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use rainhub_domain::device::{AttributeValue, Device, DeviceKind};
use rainhub_domain::error::RainHubError;
use rainhub_domain::id::DeviceId;
use rainhub_domain::weather::{FeedRole, field};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherFeedConfig {
    pub id: DeviceId,
    pub name: String,
    pub role: FeedRole,
    #[serde(default)]
    pub metrics: HashMap<String, AttributeValue>,
}

impl WeatherFeedConfig {
    /// # Errors
    ///
    /// Returns a validation error if the id or name is empty.
    pub fn discover(&self) -> Result<Device, RainHubError> {
        let mut builder = Device::builder()
            .id(self.id.clone())
            .name(self.name.clone())
            .kind(DeviceKind::SensorMultilevel)
            .probe(self.role.probe())
            .metric(field::CHANGE, 0_i64);
        for (key, value) in &self.metrics {
            builder = builder.metric(key.clone(), value.clone());
        }
        builder.build()
    }
}
