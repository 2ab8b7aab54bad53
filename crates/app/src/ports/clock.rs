//! Clock port: wall-clock time used for persisted timestamps.
//!
//! Timers themselves run on tokio time; the clock only stamps
//! `last_rain`, cooldown deadlines and events.

use rainhub_domain::time::{Timestamp, now};

pub trait Clock {
    fn now(&self) -> Timestamp;
}

impl<T: Clock> Clock for std::sync::Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        now()
    }
}
