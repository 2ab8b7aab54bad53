//! Weather vocabulary interpreted by the rain evaluator.
//!
//! Feeds announce their role through the device `probe` marker. Each role
//! exposes a fixed set of metric fields; everything else in a provider
//! payload is ignored.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Metric field names read from weather feeds.
pub mod field {
    /// Binary sensor level.
    pub const LEVEL: &str = "level";
    /// Bumped by feeds whenever any of their readings change.
    pub const CHANGE: &str = "change";
    pub const CONDITION_GROUP: &str = "condition_group";
    pub const PRECIPITATION_INTENSITY: &str = "precipitation_intensity";
    pub const POP: &str = "pop";
    pub const SEVERITY: &str = "severity";
    pub const CATEGORIES: &str = "categories";
    pub const CONDITION_CODE: &str = "condition_code";
    /// Tag field recorded for a matching alert.
    pub const ALERT: &str = "alert";
}

/// Alert severity must be strictly above this level to count.
pub const MIN_ALERT_SEVERITY: i64 = 1;

/// Alert categories that denote precipitation.
pub const PRECIPITATION_ALERTS: [&str; 4] = ["rain", "snow", "thunderstorm", "freezing_rain"];

/// Coarse condition group reported by current/forecast feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionGroup {
    Fair,
    Neutral,
    Poor,
    Snow,
}

impl ConditionGroup {
    /// `poor` and `snow` conditions count as precipitation.
    #[must_use]
    pub fn is_precipitation(self) -> bool {
        matches!(self, Self::Poor | Self::Snow)
    }
}

/// Error for unrecognised condition group strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown condition group {0:?}")]
pub struct UnknownConditionGroup(String);

impl FromStr for ConditionGroup {
    type Err = UnknownConditionGroup;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fair" => Ok(Self::Fair),
            "neutral" => Ok(Self::Neutral),
            "poor" => Ok(Self::Poor),
            "snow" => Ok(Self::Snow),
            _ => Err(UnknownConditionGroup(s.to_string())),
        }
    }
}

/// Role a weather feed plays, announced through its device `probe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedRole {
    CurrentWeather,
    Forecast,
    Alert,
    ConditionCode,
}

impl FeedRole {
    /// All roles in evaluation order.
    pub const ALL: [Self; 4] = [
        Self::CurrentWeather,
        Self::Forecast,
        Self::Alert,
        Self::ConditionCode,
    ];

    /// The probe marker a device carries to fulfil this role.
    #[must_use]
    pub fn probe(self) -> &'static str {
        match self {
            Self::CurrentWeather => "weather_current",
            Self::Forecast => "weather_forecast",
            Self::Alert => "weather_alert",
            Self::ConditionCode => "weather_condition",
        }
    }

    #[must_use]
    pub fn from_probe(probe: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.probe() == probe)
    }
}

/// Whether a numeric weather code denotes precipitation or a severe
/// precipitation-related event.
///
/// Ranges: thunderstorm 200–232, drizzle 300–321, rain 500–531,
/// snow 600–622, squalls 771, tropical storm / hurricane 901–902,
/// hail 906, storms 960–962.
#[must_use]
pub fn is_precipitation_code(code: i64) -> bool {
    matches!(
        code,
        200..=232 | 300..=321 | 500..=531 | 600..=622 | 771 | 901 | 902 | 906 | 960..=962
    )
}

/// Whether an alert with the given severity and categories signals
/// precipitation.
#[must_use]
pub fn is_precipitation_alert<'a>(
    severity: i64,
    categories: impl IntoIterator<Item = &'a str>,
) -> bool {
    severity > MIN_ALERT_SEVERITY
        && categories
            .into_iter()
            .any(|category| PRECIPITATION_ALERTS.contains(&category.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_treat_light_rain_code_as_precipitation() {
        assert!(is_precipitation_code(500));
    }

    #[test]
    fn should_not_treat_clear_sky_code_as_precipitation() {
        assert!(!is_precipitation_code(800));
    }

    #[test]
    fn should_cover_range_boundaries() {
        for code in [200, 232, 300, 321, 500, 531, 600, 622, 771, 901, 902, 906, 960, 962] {
            assert!(is_precipitation_code(code), "{code} should match");
        }
        for code in [199, 233, 322, 499, 532, 623, 770, 900, 903, 905, 959, 963] {
            assert!(!is_precipitation_code(code), "{code} should not match");
        }
    }

    #[test]
    fn should_parse_condition_group_case_insensitively() {
        assert_eq!("Poor".parse::<ConditionGroup>(), Ok(ConditionGroup::Poor));
        assert_eq!(" snow ".parse::<ConditionGroup>(), Ok(ConditionGroup::Snow));
        assert!("drizzly".parse::<ConditionGroup>().is_err());
    }

    #[test]
    fn should_only_treat_poor_and_snow_as_precipitation() {
        assert!(ConditionGroup::Poor.is_precipitation());
        assert!(ConditionGroup::Snow.is_precipitation());
        assert!(!ConditionGroup::Fair.is_precipitation());
        assert!(!ConditionGroup::Neutral.is_precipitation());
    }

    #[test]
    fn should_map_probe_markers_to_roles() {
        assert_eq!(
            FeedRole::from_probe("weather_forecast"),
            Some(FeedRole::Forecast)
        );
        assert_eq!(FeedRole::from_probe("temperature"), None);
        for role in FeedRole::ALL {
            assert_eq!(FeedRole::from_probe(role.probe()), Some(role));
        }
    }

    #[test]
    fn should_require_severity_above_minimum_for_alert() {
        assert!(!is_precipitation_alert(MIN_ALERT_SEVERITY, ["rain"]));
        assert!(is_precipitation_alert(MIN_ALERT_SEVERITY + 1, ["rain"]));
    }

    #[test]
    fn should_require_precipitation_category_for_alert() {
        assert!(!is_precipitation_alert(3, ["wind", "fog"]));
        assert!(is_precipitation_alert(3, ["wind", "freezing_rain"]));
    }
}
