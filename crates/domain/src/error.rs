//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`RainHubError`] via `#[from]`. Adapters box their own errors into
//! [`RainHubError::Storage`].

/// Top-level error shared by every crate in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum RainHubError {
    /// A domain invariant or configuration rule was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A looked-up device or record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The engine actor is gone or could not be scheduled.
    #[error("scheduling error")]
    Scheduling(#[from] SchedulingError),

    /// An adapter-level failure (database, transport, …).
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain validation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("device id must not be empty")]
    EmptyDeviceId,

    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{field} must be greater than zero")]
    ZeroInterval { field: &'static str },

    #[error("{field} must be at most {max} seconds, got {value}")]
    IntervalTooLong {
        field: &'static str,
        max: u64,
        value: u64,
    },

    #[error("{0} is both the engine id and one of its devices")]
    SelfReference(String),

    #[error("rain state is inconsistent: {0}")]
    InconsistentState(&'static str),
}

/// A record that was expected to exist was not found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Failures of the engine's serialized actor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulingError {
    #[error("engine is not running")]
    NotRunning,

    #[error("engine is already running")]
    AlreadyRunning,
}
