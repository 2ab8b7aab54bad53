//! Condition evaluator: turns source readings into a [`Verdict`].
//!
//! Rules run in a fixed order and every matching rule contributes a tag:
//!
//! 1. binary rain sensors reporting `on`
//! 2. current weather, then forecast: condition group, else intensity,
//!    else probability of precipitation (first matching tier wins)
//! 3. alert feed: severity and precipitation category
//! 4. condition-code feed: precipitation code allow-list
//!
//! The probability reported in the verdict is the last one observed in
//! that order, whether or not it fired.

use rainhub_domain::config::RainConfig;
use rainhub_domain::device::{AttributeValue, Device};
use rainhub_domain::id::SourceTag;
use rainhub_domain::verdict::Verdict;
use rainhub_domain::weather::{
    ConditionGroup, FeedRole, field, is_precipitation_alert, is_precipitation_code,
};

use super::registry::Readings;

/// Stateless evaluator parameterised by the enabled thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConditionEvaluator {
    pop_threshold: Option<f64>,
    intensity_threshold: Option<f64>,
}

impl ConditionEvaluator {
    /// Thresholds are taken as-is; pass `None` to disable a tier.
    #[must_use]
    pub fn new(pop_threshold: Option<f64>, intensity_threshold: Option<f64>) -> Self {
        Self {
            pop_threshold,
            intensity_threshold,
        }
    }

    #[must_use]
    pub fn from_config(config: &RainConfig) -> Self {
        Self::new(config.pop_threshold(), config.intensity_threshold())
    }

    #[must_use]
    pub fn evaluate(&self, readings: &Readings) -> Verdict {
        let mut verdict = Verdict::default();

        for sensor in &readings.sensors {
            if sensor.level.is_on() {
                verdict.push(SourceTag::new(sensor.id.clone(), field::LEVEL));
            }
        }

        for (role, device) in &readings.feeds {
            match role {
                FeedRole::CurrentWeather | FeedRole::Forecast => {
                    self.check_weather(device, &mut verdict);
                }
                FeedRole::Alert => check_alert(device, &mut verdict),
                FeedRole::ConditionCode => check_condition_code(device, &mut verdict),
            }
        }

        verdict
    }

    fn check_weather(&self, device: &Device, verdict: &mut Verdict) {
        let pop = number(device, field::POP).map(|value| value.clamp(0.0, 100.0));
        if pop.is_some() {
            verdict.probability = pop;
        }

        let group = device
            .metric(field::CONDITION_GROUP)
            .and_then(AttributeValue::as_str)
            .and_then(|raw| match raw.parse::<ConditionGroup>() {
                Ok(group) => Some(group),
                Err(err) => {
                    tracing::debug!(device = %device.id, error = %err, "ignoring condition group");
                    None
                }
            });
        if group.is_some_and(ConditionGroup::is_precipitation) {
            verdict.push(SourceTag::new(device.id.clone(), field::CONDITION_GROUP));
            return;
        }

        if let Some(threshold) = self.intensity_threshold
            && number(device, field::PRECIPITATION_INTENSITY)
                .is_some_and(|intensity| intensity >= threshold)
        {
            verdict.push(SourceTag::new(
                device.id.clone(),
                field::PRECIPITATION_INTENSITY,
            ));
            return;
        }

        if let Some(threshold) = self.pop_threshold
            && pop.is_some_and(|pop| pop >= threshold)
        {
            verdict.push(SourceTag::new(device.id.clone(), field::POP));
        }
    }
}

fn check_alert(device: &Device, verdict: &mut Verdict) {
    let Some(severity) = device.metric(field::SEVERITY).and_then(AttributeValue::as_i64) else {
        tracing::debug!(device = %device.id, "alert feed has no severity");
        return;
    };
    let categories = device
        .metric(field::CATEGORIES)
        .and_then(AttributeValue::as_str_list)
        .unwrap_or_default();
    if is_precipitation_alert(severity, categories) {
        verdict.push(SourceTag::new(device.id.clone(), field::ALERT));
    }
}

fn check_condition_code(device: &Device, verdict: &mut Verdict) {
    match device
        .metric(field::CONDITION_CODE)
        .and_then(AttributeValue::as_i64)
    {
        Some(code) if is_precipitation_code(code) => {
            verdict.push(SourceTag::new(device.id.clone(), field::CONDITION_CODE));
        }
        Some(_) => {}
        None => tracing::debug!(device = %device.id, "condition feed has no code"),
    }
}

/// Finite numeric metric, or `None` when missing or wrong-shaped.
fn number(device: &Device, key: &str) -> Option<f64> {
    device
        .metric(key)
        .and_then(AttributeValue::as_f64)
        .filter(|value| value.is_finite())
}
