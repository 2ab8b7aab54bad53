//! Device bus port: read, watch and refresh devices owned by other modules.
//!
//! The bus is the shared registry of devices. The rain engine reads its
//! sources through it, subscribes to field changes, asks binary sensors
//! to re-read their hardware, and publishes its own device on it.

use std::fmt;
use std::future::Future;

use tokio::sync::mpsc;

use rainhub_domain::device::Device;
use rainhub_domain::error::RainHubError;
use rainhub_domain::id::DeviceId;

/// Notification that a watched field of a device changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceChanged {
    pub device: DeviceId,
    pub field: String,
}

/// Live subscription to a device field.
///
/// The subscription stays active for as long as the handle is alive;
/// dropping it (or calling [`unsubscribe`](Self::unsubscribe)) releases it.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Wrap the closure the bus runs to release the subscription.
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Release the subscription now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Access to the shared device registry.
pub trait DeviceBus {
    /// Look up a device by id.
    ///
    /// Returns [`RainHubError::NotFound`] when no such device is registered.
    fn get(&self, id: &DeviceId) -> impl Future<Output = Result<Device, RainHubError>> + Send;

    /// Snapshot every registered device.
    fn list(&self) -> impl Future<Output = Result<Vec<Device>, RainHubError>> + Send;

    /// Watch `field` of device `id`; each change is sent on `sender`.
    ///
    /// Subscribing to a device that is not registered yet is allowed.
    ///
    /// # Errors
    ///
    /// Adapters may refuse the subscription (e.g. the bus is shutting down).
    fn subscribe(
        &self,
        id: &DeviceId,
        field: &str,
        sender: mpsc::UnboundedSender<SourceChanged>,
    ) -> Result<Subscription, RainHubError>;

    /// Ask a device to actively re-read its state.
    fn refresh(&self, id: &DeviceId) -> impl Future<Output = Result<(), RainHubError>> + Send;

    /// Register or replace a device.
    fn upsert(&self, device: Device) -> impl Future<Output = Result<(), RainHubError>> + Send;

    /// Unregister a device. Removing an unknown device is a no-op.
    fn remove(&self, id: &DeviceId) -> impl Future<Output = Result<(), RainHubError>> + Send;
}

impl<T: DeviceBus + Send + Sync> DeviceBus for std::sync::Arc<T> {
    fn get(&self, id: &DeviceId) -> impl Future<Output = Result<Device, RainHubError>> + Send {
        (**self).get(id)
    }

    fn list(&self) -> impl Future<Output = Result<Vec<Device>, RainHubError>> + Send {
        (**self).list()
    }

    fn subscribe(
        &self,
        id: &DeviceId,
        field: &str,
        sender: mpsc::UnboundedSender<SourceChanged>,
    ) -> Result<Subscription, RainHubError> {
        (**self).subscribe(id, field, sender)
    }

    fn refresh(&self, id: &DeviceId) -> impl Future<Output = Result<(), RainHubError>> + Send {
        (**self).refresh(id)
    }

    fn upsert(&self, device: Device) -> impl Future<Output = Result<(), RainHubError>> + Send {
        (**self).upsert(device)
    }

    fn remove(&self, id: &DeviceId) -> impl Future<Output = Result<(), RainHubError>> + Send {
        (**self).remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn should_release_subscription_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&released);
        let subscription = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(released.load(Ordering::SeqCst), 0);
        drop(subscription);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn should_release_subscription_once_on_unsubscribe() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&released);
        Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unsubscribe();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
