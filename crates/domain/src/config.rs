//! Rain engine configuration, deserialized from the `[rain]` table.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::DeviceId;

/// Default safety sweep period, in seconds.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 600;

/// Longest accepted sweep or poll period, in seconds (one week).
pub const MAX_INTERVAL_SECS: u64 = 7 * 24 * 3600;

/// Read-only configuration of one rain engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainConfig {
    /// Engine id, also used as the id of the device the engine publishes.
    pub id: DeviceId,
    /// Display title, used in notifications.
    pub name: String,
    /// Optional display location, used in notifications.
    pub location: Option<String>,
    /// Binary rain sensors to watch and poll.
    pub rain_sensors: Vec<DeviceId>,
    /// Window/door contacts checked when rain starts.
    pub openings: Vec<DeviceId>,
    /// Probability of precipitation (percent) at or above which it rains.
    pub pop_threshold: Option<f64>,
    /// Precipitation intensity at or above which it rains.
    pub intensity_threshold: Option<f64>,
    pub cooldown_minutes: Option<u32>,
    pub poll_interval_secs: Option<u64>,
    pub sweep_interval_secs: u64,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            id: DeviceId::from("rain"),
            name: "Rain".to_string(),
            location: None,
            rain_sensors: Vec::new(),
            openings: Vec::new(),
            pop_threshold: None,
            intensity_threshold: None,
            cooldown_minutes: None,
            poll_interval_secs: None,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

impl RainConfig {
    /// Probability threshold, when enabled (present and strictly positive).
    #[must_use]
    pub fn pop_threshold(&self) -> Option<f64> {
        self.pop_threshold.filter(|value| *value > 0.0)
    }

    /// Intensity threshold, when enabled (present and strictly positive).
    #[must_use]
    pub fn intensity_threshold(&self) -> Option<f64> {
        self.intensity_threshold.filter(|value| *value > 0.0)
    }

    /// Cooldown duration, `None` when no cooldown is configured.
    #[must_use]
    pub fn cooldown(&self) -> Option<Duration> {
        self.cooldown_minutes
            .filter(|minutes| *minutes > 0)
            .map(|minutes| Duration::from_secs(u64::from(minutes) * 60))
    }

    /// Base poll interval, `None` when polling is disabled.
    #[must_use]
    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Check configuration rules.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyDeviceId);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self
            .rain_sensors
            .iter()
            .chain(&self.openings)
            .any(|device| *device == self.id)
        {
            return Err(ValidationError::SelfReference(self.id.to_string()));
        }
        if let Some(value) = self.pop_threshold
            && !(0.0..=100.0).contains(&value)
        {
            return Err(ValidationError::OutOfRange {
                field: "pop_threshold",
                min: 0.0,
                max: 100.0,
                value,
            });
        }
        if let Some(value) = self.intensity_threshold
            && !(value >= 0.0 && value.is_finite())
        {
            return Err(ValidationError::OutOfRange {
                field: "intensity_threshold",
                min: 0.0,
                max: f64::MAX,
                value,
            });
        }
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::ZeroInterval {
                field: "sweep_interval_secs",
            });
        }
        for (field, value) in [
            ("sweep_interval_secs", Some(self.sweep_interval_secs)),
            ("poll_interval_secs", self.poll_interval_secs),
        ] {
            if let Some(value) = value
                && value > MAX_INTERVAL_SECS
            {
                return Err(ValidationError::IntervalTooLong {
                    field,
                    max: MAX_INTERVAL_SECS,
                    value,
                });
            }
        }
        Ok(())
    }
}
