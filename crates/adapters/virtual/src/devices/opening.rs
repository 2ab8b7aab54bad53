//! Virtual window/door contact. `on` means open.

use serde::{Deserialize, Serialize};

use rainhub_domain::device::{Device, DeviceKind, Level};
use rainhub_domain::error::RainHubError;
use rainhub_domain::id::DeviceId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningConfig {
    pub id: DeviceId,
    pub name: String,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub open: bool,
}

impl OpeningConfig {
    /// # Errors
    ///
    /// Returns a validation error if the id or name is empty.
    pub fn discover(&self) -> Result<Device, RainHubError> {
        let mut builder = Device::builder()
            .id(self.id.clone())
            .name(self.name.clone())
            .kind(DeviceKind::SensorBinary)
            .probe("door-window")
            .level(Level::from(self.open));
        if let Some(area) = &self.area {
            builder = builder.area(area.clone());
        }
        builder.build()
    }
}
