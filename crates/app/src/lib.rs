//! # rainhub-app
//!
//! Application layer: the rain engine and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceBus`: read, watch and refresh devices, publish the engine's own
//!   - `RainStateStore`: load & save the persisted rain state
//!   - `EventPublisher`: fire-and-forget domain events
//!   - `Notifier`: deliver user-facing notifications
//!   - `Clock`: wall-clock time
//! - Define the **driving/inbound side**:
//!   - `RainEngine` / `RainControl`: start, force an update, read the state
//!   - `RainService`: `Module` lifecycle around one engine
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `rainhub-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod engine;
pub mod event_bus;
pub mod ports;
pub mod services;

#[cfg(test)]
mod test_support;
