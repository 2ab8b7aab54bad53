//! Poll scheduler: how often rain sensors are asked to re-read.
//!
//! The interval scales with the probability of precipitation and never
//! drops below [`POLL_FLOOR`].

use std::future::pending;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{Sleep, sleep};

/// Shortest interval between two polls.
pub const POLL_FLOOR: Duration = Duration::from_secs(60);

/// `max(base × p / 100, floor)`; `base` when the probability is unknown.
#[must_use]
pub fn effective_interval(base: Duration, probability: Option<f64>) -> Duration {
    match probability.filter(|value| value.is_finite()) {
        None => base,
        Some(probability) => {
            let scaled = base.mul_f64(probability.clamp(0.0, 100.0) / 100.0);
            scaled.max(POLL_FLOOR)
        }
    }
}

/// Owns the poll timer. Disabled schedulers never fire.
pub struct PollScheduler {
    base: Option<Duration>,
    timer: Option<Pin<Box<Sleep>>>,
}

impl PollScheduler {
    #[must_use]
    pub fn new(base: Option<Duration>) -> Self {
        Self { base, timer: None }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.base.is_some()
    }

    /// Arm the next poll, replacing any pending one.
    /// Returns the interval used, `None` when polling is disabled.
    pub fn schedule(&mut self, probability: Option<f64>) -> Option<Duration> {
        let interval = effective_interval(self.base?, probability);
        self.timer = Some(Box::pin(sleep(interval)));
        Some(interval)
    }

    pub fn cancel(&mut self) {
        self.timer = None;
    }

    /// Resolves when the armed poll is due, disarming it.
    pub async fn elapsed(&mut self) {
        match self.timer.as_mut() {
            Some(timer) => {
                timer.as_mut().await;
                self.timer = None;
            }
            None => pending().await,
        }
    }
}
