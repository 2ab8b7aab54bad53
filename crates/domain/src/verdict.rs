//! Verdict: the evaluator's momentary rain judgment, before hysteresis.

use serde::{Deserialize, Serialize};

use crate::id::SourceTag;

/// Output of one evaluation pass over all bound sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// At least one rule fired.
    pub rain: bool,
    /// Every rule that fired, in rule-check order.
    pub sources: Vec<SourceTag>,
    /// Last probability of precipitation observed, in percent.
    pub probability: Option<f64>,
}

impl Verdict {
    /// Record a fired rule.
    pub fn push(&mut self, tag: SourceTag) {
        self.rain = true;
        self.sources.push(tag);
    }

    /// A dry verdict that only carries a probability reading.
    #[must_use]
    pub fn dry(probability: Option<f64>) -> Self {
        Self {
            rain: false,
            sources: Vec::new(),
            probability,
        }
    }
}
