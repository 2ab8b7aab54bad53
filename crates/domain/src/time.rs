//! Time and timestamp helpers.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// UTC timestamp used for rain timestamps, cooldown deadlines, event times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Time left from `now` until `deadline`, or `None` once the deadline is
/// reached or passed.
#[must_use]
pub fn remaining(deadline: Timestamp, now: Timestamp) -> Option<Duration> {
    if deadline <= now {
        return None;
    }
    (deadline - now).to_std().ok()
}

/// Add a std [`Duration`] to a timestamp, saturating on overflow.
#[must_use]
pub fn add(ts: Timestamp, duration: Duration) -> Timestamp {
    chrono::Duration::from_std(duration)
        .ok()
        .and_then(|delta| ts.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
