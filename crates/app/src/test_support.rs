//! In-memory fakes for the ports, shared by the engine tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use rainhub_domain::device::{AttributeValue, Device, DeviceKind, Level};
use rainhub_domain::error::{NotFoundError, RainHubError};
use rainhub_domain::event::{Event, EventType};
use rainhub_domain::id::DeviceId;
use rainhub_domain::notification::Notification;
use rainhub_domain::rain::RainState;
use rainhub_domain::time::{Timestamp, add};
use rainhub_domain::weather::{FeedRole, field};

use crate::ports::{
    Clock, DeviceBus, EventPublisher, Notifier, RainStateStore, SourceChanged, Subscription,
};

// ── Device bus ─────────────────────────────────────────────────

struct Listener {
    key: u64,
    device: DeviceId,
    field: String,
    sender: mpsc::UnboundedSender<SourceChanged>,
}

#[derive(Default)]
struct BusInner {
    devices: HashMap<DeviceId, Device>,
    listeners: Vec<Listener>,
    refreshed: Vec<DeviceId>,
    next_key: u64,
}

#[derive(Clone, Default)]
pub struct FakeBus {
    inner: Arc<Mutex<BusInner>>,
}

impl FakeBus {
    pub fn with(devices: impl IntoIterator<Item = Device>) -> Self {
        let bus = Self::default();
        for device in devices {
            bus.insert(device);
        }
        bus
    }

    pub fn insert(&self, device: Device) {
        let mut inner = self.inner.lock().unwrap();
        inner.devices.insert(device.id.clone(), device);
    }

    pub fn set_level(&self, id: &str, level: Level) {
        let mut inner = self.inner.lock().unwrap();
        let id = DeviceId::from(id);
        inner.devices.get_mut(&id).unwrap().level = level;
        notify(&inner, &id, field::LEVEL);
    }

    pub fn set_metric(&self, id: &str, key: &str, value: impl Into<AttributeValue>) {
        let mut inner = self.inner.lock().unwrap();
        let id = DeviceId::from(id);
        inner
            .devices
            .get_mut(&id)
            .unwrap()
            .metrics
            .insert(key.to_string(), value.into());
        notify(&inner, &id, field::CHANGE);
    }

    pub fn device(&self, id: &str) -> Option<Device> {
        self.inner
            .lock()
            .unwrap()
            .devices
            .get(&DeviceId::from(id))
            .cloned()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().unwrap().listeners.len()
    }

    pub fn refreshed(&self) -> Vec<DeviceId> {
        self.inner.lock().unwrap().refreshed.clone()
    }
}

fn notify(inner: &BusInner, id: &DeviceId, field: &str) {
    for listener in &inner.listeners {
        if &listener.device == id && listener.field == field {
            let _ = listener.sender.send(SourceChanged {
                device: id.clone(),
                field: field.to_string(),
            });
        }
    }
}

impl DeviceBus for FakeBus {
    fn get(&self, id: &DeviceId) -> impl Future<Output = Result<Device, RainHubError>> + Send {
        let result: Result<Device, RainHubError> = self
            .inner
            .lock()
            .unwrap()
            .devices
            .get(id)
            .cloned()
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Device",
                    id: id.to_string(),
                }
                .into()
            });
        async { result }
    }

    fn list(&self) -> impl Future<Output = Result<Vec<Device>, RainHubError>> + Send {
        let devices: Vec<Device> = self.inner.lock().unwrap().devices.values().cloned().collect();
        async { Ok(devices) }
    }

    fn subscribe(
        &self,
        id: &DeviceId,
        field: &str,
        sender: mpsc::UnboundedSender<SourceChanged>,
    ) -> Result<Subscription, RainHubError> {
        let mut inner = self.inner.lock().unwrap();
        let key = inner.next_key;
        inner.next_key += 1;
        inner.listeners.push(Listener {
            key,
            device: id.clone(),
            field: field.to_string(),
            sender,
        });
        let shared = Arc::clone(&self.inner);
        Ok(Subscription::new(move || {
            shared
                .lock()
                .unwrap()
                .listeners
                .retain(|listener| listener.key != key);
        }))
    }

    fn refresh(&self, id: &DeviceId) -> impl Future<Output = Result<(), RainHubError>> + Send {
        self.inner.lock().unwrap().refreshed.push(id.clone());
        async { Ok(()) }
    }

    fn upsert(&self, device: Device) -> impl Future<Output = Result<(), RainHubError>> + Send {
        self.insert(device);
        async { Ok(()) }
    }

    fn remove(&self, id: &DeviceId) -> impl Future<Output = Result<(), RainHubError>> + Send {
        self.inner.lock().unwrap().devices.remove(id);
        async { Ok(()) }
    }
}

// ── Device fixtures ────────────────────────────────────────────

pub fn sensor(id: &str, level: Level) -> Device {
    Device::builder()
        .id(id)
        .name(id)
        .kind(DeviceKind::SensorBinary)
        .level(level)
        .build()
        .unwrap()
}

pub fn opening(id: &str, name: &str, area: Option<&str>, level: Level) -> Device {
    let mut builder = Device::builder()
        .id(id)
        .name(name)
        .kind(DeviceKind::SensorBinary)
        .level(level);
    if let Some(area) = area {
        builder = builder.area(area);
    }
    builder.build().unwrap()
}

pub fn feed(id: &str, role: FeedRole, metrics: &[(&str, AttributeValue)]) -> Device {
    let mut builder = Device::builder()
        .id(id)
        .name(id)
        .kind(DeviceKind::SensorMultilevel)
        .probe(role.probe());
    for (key, value) in metrics {
        builder = builder.metric(*key, value.clone());
    }
    builder.build().unwrap()
}

// ── Spies ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct SpyPublisher {
    events: Mutex<Vec<Event>>,
}

impl SpyPublisher {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, event_type: EventType) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.event_type == event_type)
            .count()
    }
}

impl EventPublisher for SpyPublisher {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), RainHubError>> + Send {
        self.events.lock().unwrap().push(event);
        async { Ok(()) }
    }
}

#[derive(Default)]
pub struct SpyNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl SpyNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl Notifier for SpyNotifier {
    fn notify(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), RainHubError>> + Send {
        self.notifications.lock().unwrap().push(notification);
        async { Ok(()) }
    }
}

// ── State store ────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
    states: Mutex<HashMap<DeviceId, RainState>>,
}

impl MemoryStore {
    pub fn with(id: &str, state: RainState) -> Self {
        let store = Self::default();
        store
            .states
            .lock()
            .unwrap()
            .insert(DeviceId::from(id), state);
        store
    }

    pub fn get(&self, id: &str) -> Option<RainState> {
        self.states
            .lock()
            .unwrap()
            .get(&DeviceId::from(id))
            .cloned()
    }
}

impl RainStateStore for MemoryStore {
    fn load(
        &self,
        id: &DeviceId,
    ) -> impl Future<Output = Result<Option<RainState>, RainHubError>> + Send {
        let state = self.states.lock().unwrap().get(id).cloned();
        async { Ok(state) }
    }

    fn save(
        &self,
        id: &DeviceId,
        state: &RainState,
    ) -> impl Future<Output = Result<(), RainHubError>> + Send {
        self.states
            .lock()
            .unwrap()
            .insert(id.clone(), state.clone());
        async { Ok(()) }
    }
}

// ── Clocks ─────────────────────────────────────────────────────

pub fn base_time() -> Timestamp {
    chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// Wall clock that follows tokio's (paused) clock from a fixed origin.
#[derive(Debug, Clone, Copy)]
pub struct PausedClock {
    base: Timestamp,
    start: tokio::time::Instant,
}

impl PausedClock {
    pub fn new() -> Self {
        Self {
            base: base_time(),
            start: tokio::time::Instant::now(),
        }
    }
}

impl Clock for PausedClock {
    fn now(&self) -> Timestamp {
        add(self.base, self.start.elapsed())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
