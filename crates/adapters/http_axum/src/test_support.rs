//! A real engine over the virtual bus, for handler tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rainhub_adapter_virtual::{RainSensorConfig, VirtualDeviceBus, VirtualDeviceConfig};
use rainhub_app::engine::{EnginePorts, RainEngine, RainHandle};
use rainhub_app::event_bus::InProcessEventBus;
use rainhub_app::ports::{Notifier, RainStateStore, SystemClock};
use rainhub_domain::config::RainConfig;
use rainhub_domain::device::Level;
use rainhub_domain::error::RainHubError;
use rainhub_domain::id::DeviceId;
use rainhub_domain::notification::Notification;
use rainhub_domain::rain::RainState;

use crate::state::AppState;

#[derive(Default)]
pub struct StubNotifier;

impl Notifier for StubNotifier {
    async fn notify(&self, _notification: Notification) -> Result<(), RainHubError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct StubStore(Mutex<HashMap<DeviceId, RainState>>);

impl RainStateStore for StubStore {
    async fn load(&self, id: &DeviceId) -> Result<Option<RainState>, RainHubError> {
        Ok(self.0.lock().unwrap().get(id).cloned())
    }

    async fn save(&self, id: &DeviceId, state: &RainState) -> Result<(), RainHubError> {
        self.0.lock().unwrap().insert(id.clone(), state.clone());
        Ok(())
    }
}

pub struct TestEngine {
    pub state: AppState,
    pub handle: RainHandle,
    pub bus: VirtualDeviceBus,
}

impl TestEngine {
    pub async fn start(wet: bool) -> Self {
        let bus = VirtualDeviceBus::from_configs(&[VirtualDeviceConfig::RainSensor(
            RainSensorConfig {
                id: DeviceId::from("s1"),
                name: "Garden sensor".to_string(),
                area: None,
                on: wet,
            },
        )])
        .unwrap();
        let config = RainConfig {
            rain_sensors: vec![DeviceId::from("s1")],
            cooldown_minutes: Some(10),
            ..RainConfig::default()
        };
        let handle = RainEngine::start(
            config.clone(),
            EnginePorts {
                bus: bus.clone(),
                publisher: Arc::new(InProcessEventBus::new(16)),
                notifier: Arc::new(StubNotifier),
                store: Arc::new(StubStore::default()),
                clock: SystemClock,
            },
        )
        .await
        .unwrap();
        let state = AppState::new(config, handle.control());
        Self { state, handle, bus }
    }

    pub fn wet(&self) {
        self.bus.set_level(&DeviceId::from("s1"), Level::On).unwrap();
    }
}
