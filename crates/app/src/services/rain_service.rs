//! Rain service: hosts one rain engine behind the [`Module`] lifecycle.

use std::future::Future;

use rainhub_domain::config::RainConfig;
use rainhub_domain::error::{RainHubError, SchedulingError};

use crate::engine::{EnginePorts, RainControl, RainEngine, RainHandle};
use crate::ports::{Clock, DeviceBus, EventPublisher, Module, Notifier, RainStateStore};

/// Owns the configuration and collaborators of an engine, and the engine
/// itself while it runs.
pub struct RainService<B, P, N, S, C> {
    config: RainConfig,
    ports: EnginePorts<B, P, N, S, C>,
    handle: Option<RainHandle>,
}

impl<B, P, N, S, C> RainService<B, P, N, S, C> {
    /// Create a stopped service.
    pub fn new(config: RainConfig, ports: EnginePorts<B, P, N, S, C>) -> Self {
        Self {
            config,
            ports,
            handle: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RainConfig {
        &self.config
    }

    /// Control of the running engine, `None` before `init` or after `shutdown`.
    #[must_use]
    pub fn control(&self) -> Option<RainControl> {
        self.handle.as_ref().map(RainHandle::control)
    }
}

impl<B, P, N, S, C> Module for RainService<B, P, N, S, C>
where
    B: DeviceBus + Clone + Send + Sync + 'static,
    P: EventPublisher + Clone + Send + Sync + 'static,
    N: Notifier + Clone + Send + Sync + 'static,
    S: RainStateStore + Clone + Send + Sync + 'static,
    C: Clock + Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "rain"
    }

    fn init(&mut self) -> impl Future<Output = Result<(), RainHubError>> + Send {
        async move {
            if self.handle.is_some() {
                return Err(SchedulingError::AlreadyRunning.into());
            }
            let handle = RainEngine::start(self.config.clone(), self.ports.clone()).await?;
            tracing::info!(engine = %self.config.id, "rain module started");
            self.handle = Some(handle);
            Ok(())
        }
    }

    fn shutdown(&mut self) -> impl Future<Output = Result<(), RainHubError>> + Send {
        async move {
            let Some(handle) = self.handle.take() else {
                return Ok(());
            };
            handle.shutdown().await?;
            tracing::info!(engine = %self.config.id, "rain module stopped");
            Ok(())
        }
    }
}
