//! Shared application state for axum handlers.

use std::sync::Arc;

use rainhub_app::engine::RainControl;
use rainhub_domain::config::RainConfig;

/// Application state shared across all axum handlers.
///
/// Cloning is cheap: the configuration sits behind an `Arc` and
/// [`RainControl`] is itself a pair of channel handles.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Configuration the engine was started with.
    pub config: Arc<RainConfig>,
    /// Control of the running engine.
    pub control: RainControl,
}

impl AppState {
    #[must_use]
    pub fn new(config: RainConfig, control: RainControl) -> Self {
        Self {
            config: Arc::new(config),
            control,
        }
    }
}
