//! Rain state: the engine's persisted output.
//!
//! The reported `level` and the raw `rain_flag` only disagree while a
//! cooldown is running: the verdict has turned dry but the engine keeps
//! reporting rain until `pending_deadline`.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::SourceTag;
use crate::time::Timestamp;

/// Probe marker of the device an engine publishes about itself.
pub const RAIN_PROBE: &str = "rain";

/// Metric names of the engine's own device.
pub mod metric {
    pub const ICON: &str = "icon";
    /// Raw rain flag, `on` or `off`.
    pub const RAIN: &str = "rain";
    pub const SOURCES: &str = "sources";
    /// Epoch seconds.
    pub const LAST_RAIN: &str = "last_rain";
    pub const POP: &str = "pop";
    /// Cooldown deadline, epoch seconds.
    pub const TIMEOUT: &str = "timeout";
}

/// Binary rain level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RainLevel {
    #[default]
    Off,
    On,
}

impl RainLevel {
    #[must_use]
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

impl From<bool> for RainLevel {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

/// Error for strings that are neither `on` nor `off`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rain level {0:?}")]
pub struct UnknownRainLevel(String);

impl std::str::FromStr for RainLevel {
    type Err = UnknownRainLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            other => Err(UnknownRainLevel(other.to_string())),
        }
    }
}

impl std::fmt::Display for RainLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
        }
    }
}

/// Where the hysteresis state machine currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RainPhase {
    Off,
    Active,
    Cooldown,
}

impl RainPhase {
    /// Human-facing indicator for the phase.
    #[must_use]
    pub fn indicator(self) -> Indicator {
        match self {
            Self::Off => Indicator::NoRain,
            Self::Active => Indicator::Raining,
            Self::Cooldown => Indicator::CoolingDown,
        }
    }
}

/// Icon-equivalent indicator published alongside the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    NoRain,
    Raining,
    CoolingDown,
}

impl Indicator {
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::NoRain => "icon_norain.png",
            Self::Raining => "icon.png",
            Self::CoolingDown => "icon_timeout.png",
        }
    }
}

/// Persisted rain state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RainState {
    pub level: RainLevel,
    pub rain_flag: RainLevel,
    pub sources: Vec<SourceTag>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub last_rain: Option<Timestamp>,
    pub precipitation_probability: Option<f64>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub pending_deadline: Option<Timestamp>,
}

impl RainState {
    /// Phase implied by the persisted fields alone.
    #[must_use]
    pub fn phase(&self) -> RainPhase {
        match (self.level, self.rain_flag) {
            (RainLevel::Off, _) => RainPhase::Off,
            (RainLevel::On, RainLevel::On) => RainPhase::Active,
            (RainLevel::On, RainLevel::Off) => RainPhase::Cooldown,
        }
    }

    /// Check the cross-field invariants at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InconsistentState`] naming the first
    /// violated invariant.
    pub fn validate(&self, now: Timestamp) -> Result<(), ValidationError> {
        if self.level.is_on()
            && !self.rain_flag.is_on()
            && !self.pending_deadline.is_some_and(|deadline| deadline > now)
        {
            return Err(ValidationError::InconsistentState(
                "level is on without rain or a running cooldown",
            ));
        }
        if self.sources.is_empty() == self.rain_flag.is_on() {
            return Err(ValidationError::InconsistentState(
                "sources must be non-empty exactly while the rain flag is on",
            ));
        }
        if !self.level.is_on() && self.rain_flag.is_on() {
            return Err(ValidationError::InconsistentState(
                "rain flag is on while level is off",
            ));
        }
        Ok(())
    }
}
