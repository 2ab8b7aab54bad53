//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the rain engine and the outside world.
//! They are defined here (in `app`) so that both the engine and the adapter
//! layer can depend on them without creating circular dependencies.

pub mod clock;
pub mod device_bus;
pub mod event_bus;
pub mod module;
pub mod notifier;
pub mod state_store;

pub use clock::{Clock, SystemClock};
pub use device_bus::{DeviceBus, SourceChanged, Subscription};
pub use event_bus::EventPublisher;
pub use module::Module;
pub use notifier::Notifier;
pub use state_store::RainStateStore;
