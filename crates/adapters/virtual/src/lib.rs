//! # rainhub-adapter-virtual
//!
//! In-memory device bus holding simulated devices, for testing and
//! demonstration.
//!
//! ## Provided devices
//!
//! | Kind | Device kind | Behaviour |
//! |------|-------------|-----------|
//! | `rain_sensor` | `sensor_binary` | `on` while wet; changes notify `level` |
//! | `opening` | `sensor_binary` | `on` while open |
//! | `weather` | `sensor_multilevel` | Feed role in `probe`; metric updates notify `change` |
//!
//! ## Dependency rule
//!
//! Depends on `rainhub-app` (port traits) and `rainhub-domain` only.

mod devices;

pub use devices::{OpeningConfig, RainSensorConfig, VirtualDeviceConfig, WeatherFeedConfig};

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use rainhub_app::ports::{DeviceBus, SourceChanged, Subscription};
use rainhub_domain::device::{AttributeValue, Device, Level};
use rainhub_domain::error::{NotFoundError, RainHubError};
use rainhub_domain::id::DeviceId;
use rainhub_domain::weather::field;

struct Listener {
    key: u64,
    device: DeviceId,
    field: String,
    sender: mpsc::UnboundedSender<SourceChanged>,
}

#[derive(Default)]
struct Inner {
    devices: HashMap<DeviceId, Device>,
    listeners: Vec<Listener>,
    refreshes: HashMap<DeviceId, usize>,
    next_key: u64,
}

impl Inner {
    fn device_mut(&mut self, id: &DeviceId) -> Result<&mut Device, RainHubError> {
        self.devices.get_mut(id).ok_or_else(|| not_found(id))
    }

    /// Send a change to every listener of `field` on `id`, dropping
    /// listeners whose receiver is gone.
    fn notify(&mut self, id: &DeviceId, field: &str) {
        self.listeners.retain(|listener| {
            if &listener.device != id || listener.field != field {
                return true;
            }
            listener
                .sender
                .send(SourceChanged {
                    device: id.clone(),
                    field: field.to_string(),
                })
                .is_ok()
        });
    }
}

fn not_found(id: &DeviceId) -> RainHubError {
    NotFoundError {
        entity: "Device",
        id: id.to_string(),
    }
    .into()
}

/// Shared, cloneable in-memory device bus.
#[derive(Clone, Default)]
pub struct VirtualDeviceBus {
    inner: Arc<Mutex<Inner>>,
}

impl VirtualDeviceBus {
    /// Build a bus pre-populated with the described devices.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a description is invalid.
    pub fn from_configs(configs: &[VirtualDeviceConfig]) -> Result<Self, RainHubError> {
        let bus = Self::default();
        {
            let mut inner = bus.lock();
            for config in configs {
                let device = config.discover()?;
                inner.devices.insert(device.id.clone(), device);
            }
        }
        Ok(bus)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the level of a device, notifying `level` listeners.
    ///
    /// # Errors
    ///
    /// Returns [`RainHubError::NotFound`] for an unknown device.
    pub fn set_level(&self, id: &DeviceId, level: Level) -> Result<(), RainHubError> {
        let mut inner = self.lock();
        let device = inner.device_mut(id)?;
        if device.level == level {
            return Ok(());
        }
        device.level = level;
        tracing::debug!(device = %id, %level, "virtual device level changed");
        inner.notify(id, field::LEVEL);
        Ok(())
    }

    /// Set a metric of a device, bump its `change` counter and notify
    /// `change` listeners.
    ///
    /// # Errors
    ///
    /// Returns [`RainHubError::NotFound`] for an unknown device.
    pub fn set_metric(
        &self,
        id: &DeviceId,
        key: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<(), RainHubError> {
        let mut inner = self.lock();
        let device = inner.device_mut(id)?;
        device.metrics.insert(key.to_string(), value.into());
        let change = device
            .metric(field::CHANGE)
            .and_then(AttributeValue::as_i64)
            .unwrap_or_default();
        device
            .metrics
            .insert(field::CHANGE.to_string(), AttributeValue::Int(change + 1));
        tracing::debug!(device = %id, metric = key, "virtual device metric changed");
        inner.notify(id, field::CHANGE);
        Ok(())
    }

    /// How many times `refresh` was requested for a device.
    #[must_use]
    pub fn refresh_count(&self, id: &DeviceId) -> usize {
        self.lock().refreshes.get(id).copied().unwrap_or_default()
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }
}

impl DeviceBus for VirtualDeviceBus {
    fn get(&self, id: &DeviceId) -> impl Future<Output = Result<Device, RainHubError>> + Send {
        let result = self
            .lock()
            .devices
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(id));
        async { result }
    }

    fn list(&self) -> impl Future<Output = Result<Vec<Device>, RainHubError>> + Send {
        let mut devices: Vec<Device> = self.lock().devices.values().cloned().collect();
        devices.sort_by(|a, b| a.id.cmp(&b.id));
        async { Ok(devices) }
    }

    fn subscribe(
        &self,
        id: &DeviceId,
        field: &str,
        sender: mpsc::UnboundedSender<SourceChanged>,
    ) -> Result<Subscription, RainHubError> {
        let mut inner = self.lock();
        let key = inner.next_key;
        inner.next_key += 1;
        inner.listeners.push(Listener {
            key,
            device: id.clone(),
            field: field.to_string(),
            sender,
        });
        let shared = Arc::downgrade(&self.inner);
        Ok(Subscription::new(move || {
            if let Some(shared) = shared.upgrade() {
                shared
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .listeners
                    .retain(|listener| listener.key != key);
            }
        }))
    }

    fn refresh(&self, id: &DeviceId) -> impl Future<Output = Result<(), RainHubError>> + Send {
        let result = {
            let mut inner = self.lock();
            if inner.devices.contains_key(id) {
                *inner.refreshes.entry(id.clone()).or_default() += 1;
                tracing::trace!(device = %id, "virtual device refreshed");
                Ok(())
            } else {
                Err(not_found(id))
            }
        };
        async { result }
    }

    fn upsert(&self, device: Device) -> impl Future<Output = Result<(), RainHubError>> + Send {
        let mut inner = self.lock();
        let id = device.id.clone();
        let previous = inner.devices.insert(id.clone(), device.clone());
        if let Some(previous) = previous {
            if previous.level != device.level {
                inner.notify(&id, field::LEVEL);
            }
            if previous.metrics != device.metrics {
                inner.notify(&id, field::CHANGE);
            }
        }
        async { Ok(()) }
    }

    fn remove(&self, id: &DeviceId) -> impl Future<Output = Result<(), RainHubError>> + Send {
        self.lock().devices.remove(id);
        async { Ok(()) }
    }
}
