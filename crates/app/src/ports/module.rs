//! Module port: lifecycle of a long-running unit hosted by the daemon.
//!
//! The binary crate calls the lifecycle methods in order:
//!
//! 1. [`init`](Module::init): bind collaborators and start background work
//! 2. (the daemon runs)
//! 3. [`shutdown`](Module::shutdown): stop background work and release
//!    every resource acquired in `init`

use std::future::Future;

use rainhub_domain::error::RainHubError;

pub trait Module {
    /// Unique name identifying this module (e.g. `"rain"`).
    fn name(&self) -> &'static str;

    /// Start the module.
    ///
    /// Failures here are fatal for the module: nothing keeps running.
    fn init(&mut self) -> impl Future<Output = Result<(), RainHubError>> + Send;

    /// Stop the module. Calling it on a module that never started is a no-op.
    fn shutdown(&mut self) -> impl Future<Output = Result<(), RainHubError>> + Send;
}
