//! The rain engine: registry → evaluator → hysteresis, driven by one actor.

pub mod actor;
pub mod evaluator;
pub mod gate;
pub mod hysteresis;
pub mod poll;
pub mod registry;

pub use actor::{EnginePorts, RainControl, RainEngine, RainHandle};
pub use evaluator::ConditionEvaluator;
pub use gate::{Alarm, NotificationGate};
pub use hysteresis::{HysteresisController, Transition};
pub use poll::{POLL_FLOOR, PollScheduler, effective_interval};
pub use registry::{Readings, SourceBinding, SourceKind, SourceRegistry};
