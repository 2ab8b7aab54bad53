//! Hysteresis controller: debounces verdicts into the reported rain level.
//!
//! ```text
//!            rain                     dry, cooldown > 0
//!   Off ───────────────▶ Active ─────────────────────────▶ Cooldown
//!    ▲                    │  ▲                               │
//!    │   dry, no cooldown │  └──────────── rain ─────────────┤
//!    └────────────────────┘                                  │
//!    └──────────────────────── timer expired ────────────────┘
//! ```
//!
//! The cooldown timer lives inside the `Cooldown` phase, so there is never
//! more than one outstanding.

use std::future::pending;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{Sleep, sleep};

use rainhub_domain::rain::{RainLevel, RainPhase, RainState};
use rainhub_domain::time::{Timestamp, add, remaining};
use rainhub_domain::verdict::Verdict;

/// Outcome of feeding the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Off → Active.
    Started,
    /// Cooldown → Active; the timer was cancelled.
    Resumed,
    /// Active → Cooldown.
    CooldownStarted { deadline: Timestamp },
    /// A persisted cooldown was picked up again at startup.
    CooldownResumed { deadline: Timestamp },
    /// Active or Cooldown → Off.
    Stopped,
    Unchanged,
}

impl Transition {
    /// Whether the reported level flipped.
    #[must_use]
    pub fn flips_level(self) -> bool {
        matches!(self, Self::Started | Self::Stopped)
    }
}

struct CooldownTimer {
    deadline: Timestamp,
    sleep: Pin<Box<Sleep>>,
}

impl CooldownTimer {
    fn arm(deadline: Timestamp, delay: Duration) -> Self {
        Self {
            deadline,
            sleep: Box::pin(sleep(delay)),
        }
    }
}

enum Phase {
    Off,
    Active,
    Cooldown(CooldownTimer),
}

pub struct HysteresisController {
    state: RainState,
    phase: Phase,
    cooldown: Option<Duration>,
}

impl HysteresisController {
    /// Rebuild the controller from a persisted state at startup.
    ///
    /// A persisted `on` level resumes as a cooldown when its deadline is
    /// still ahead; otherwise the level is reset and [`Transition::Stopped`]
    /// returned. The deadline is `last_rain` plus the current cooldown (or
    /// `now` plus the cooldown without a `last_rain`), shortened to the saved
    /// deadline when that one is earlier. A shorter cooldown configured since
    /// the state was saved therefore takes effect on restart.
    #[must_use]
    pub fn resume(
        persisted: RainState,
        cooldown: Option<Duration>,
        now: Timestamp,
    ) -> (Self, Transition) {
        let mut controller = Self {
            state: persisted,
            phase: Phase::Off,
            cooldown,
        };

        if !controller.state.level.is_on() {
            controller.clear_rain();
            return (controller, Transition::Unchanged);
        }

        let deadline = controller.cooldown.map(|cooldown| {
            let cap = add(controller.state.last_rain.unwrap_or(now), cooldown);
            controller
                .state
                .pending_deadline
                .map_or(cap, |saved| saved.min(cap))
        });
        let delay =
            deadline.and_then(|deadline| remaining(deadline, now).map(|delay| (deadline, delay)));

        match delay {
            Some((deadline, delay)) => {
                controller.enter_cooldown(deadline, delay);
                (controller, Transition::CooldownResumed { deadline })
            }
            None => {
                controller.reset();
                (controller, Transition::Stopped)
            }
        }
    }

    #[must_use]
    pub fn state(&self) -> &RainState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> RainPhase {
        match self.phase {
            Phase::Off => RainPhase::Off,
            Phase::Active => RainPhase::Active,
            Phase::Cooldown(_) => RainPhase::Cooldown,
        }
    }

    /// Deadline of the running cooldown, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Timestamp> {
        match &self.phase {
            Phase::Cooldown(timer) => Some(timer.deadline),
            _ => None,
        }
    }

    /// Feed a fresh verdict.
    pub fn apply(&mut self, verdict: Verdict, now: Timestamp) -> Transition {
        self.state.precipitation_probability = verdict.probability;

        if verdict.rain {
            let transition = match self.phase {
                Phase::Off => Transition::Started,
                Phase::Cooldown(_) => Transition::Resumed,
                Phase::Active => Transition::Unchanged,
            };
            self.phase = Phase::Active;
            self.state.level = RainLevel::On;
            self.state.rain_flag = RainLevel::On;
            self.state.sources = verdict.sources;
            self.state.last_rain = Some(now);
            self.state.pending_deadline = None;
            return transition;
        }

        match (&self.phase, self.cooldown) {
            (Phase::Active, Some(cooldown)) => {
                let deadline = add(now, cooldown);
                self.enter_cooldown(deadline, cooldown);
                Transition::CooldownStarted { deadline }
            }
            (Phase::Active, None) => {
                self.reset();
                Transition::Stopped
            }
            (Phase::Off | Phase::Cooldown(_), _) => Transition::Unchanged,
        }
    }

    /// The cooldown timer fired.
    pub fn expire(&mut self) -> Transition {
        if matches!(self.phase, Phase::Cooldown(_)) {
            self.reset();
            Transition::Stopped
        } else {
            Transition::Unchanged
        }
    }

    /// Resolves when the running cooldown elapses; never resolves otherwise.
    pub async fn cooldown_elapsed(&mut self) {
        match &mut self.phase {
            Phase::Cooldown(timer) => timer.sleep.as_mut().await,
            _ => pending().await,
        }
    }

    fn enter_cooldown(&mut self, deadline: Timestamp, delay: Duration) {
        self.phase = Phase::Cooldown(CooldownTimer::arm(deadline, delay));
        self.state.level = RainLevel::On;
        self.state.rain_flag = RainLevel::Off;
        self.state.sources.clear();
        self.state.pending_deadline = Some(deadline);
    }

    fn reset(&mut self) {
        self.phase = Phase::Off;
        self.state.level = RainLevel::Off;
        self.clear_rain();
    }

    fn clear_rain(&mut self) {
        self.state.rain_flag = RainLevel::Off;
        self.state.sources.clear();
        self.state.pending_deadline = None;
    }
}
