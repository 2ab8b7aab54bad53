//! State store port: persist the rain state across restarts.

use std::future::Future;

use rainhub_domain::error::RainHubError;
use rainhub_domain::id::DeviceId;
use rainhub_domain::rain::RainState;

/// Loads and saves the [`RainState`] of an engine, keyed by engine id.
pub trait RainStateStore {
    /// Return the last saved state, or `None` for a fresh engine.
    fn load(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<RainState>, RainHubError>> + Send;

    /// Replace the saved state.
    fn save(
        &self,
        id: &DeviceId,
        state: &RainState,
    ) -> impl Future<Output = Result<(), RainHubError>> + Send;
}

impl<T: RainStateStore + Send + Sync> RainStateStore for std::sync::Arc<T> {
    fn load(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<RainState>, RainHubError>> + Send {
        (**self).load(id)
    }

    fn save(
        &self,
        id: &DeviceId,
        state: &RainState,
    ) -> impl Future<Output = Result<(), RainHubError>> + Send {
        (**self).save(id, state)
    }
}
