//! Source registry: the devices an engine reads, and its live subscriptions.
//!
//! Binary rain sensors come from configuration. Weather feeds are found by
//! scanning the bus for multilevel sensors whose `probe` names a
//! [`FeedRole`]; the first device found for a role is bound, later ones are
//! ignored.

use tokio::sync::mpsc;

use rainhub_domain::device::{Device, DeviceKind};
use rainhub_domain::error::RainHubError;
use rainhub_domain::id::DeviceId;
use rainhub_domain::weather::{FeedRole, field};

use crate::ports::{DeviceBus, SourceChanged, Subscription};

/// What a bound source is, and therefore how it is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    BinarySensor,
    CurrentWeather,
    Forecast,
    Alert,
    ConditionCode,
}

impl SourceKind {
    /// Field whose changes trigger a re-evaluation.
    #[must_use]
    pub fn field(self) -> &'static str {
        match self {
            Self::BinarySensor => field::LEVEL,
            _ => field::CHANGE,
        }
    }

    #[must_use]
    pub fn role(self) -> Option<FeedRole> {
        match self {
            Self::BinarySensor => None,
            Self::CurrentWeather => Some(FeedRole::CurrentWeather),
            Self::Forecast => Some(FeedRole::Forecast),
            Self::Alert => Some(FeedRole::Alert),
            Self::ConditionCode => Some(FeedRole::ConditionCode),
        }
    }
}

impl From<FeedRole> for SourceKind {
    fn from(role: FeedRole) -> Self {
        match role {
            FeedRole::CurrentWeather => Self::CurrentWeather,
            FeedRole::Forecast => Self::Forecast,
            FeedRole::Alert => Self::Alert,
            FeedRole::ConditionCode => Self::ConditionCode,
        }
    }
}

/// A device the engine reads, fixed for the lifetime of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBinding {
    pub id: DeviceId,
    pub kind: SourceKind,
}

impl SourceBinding {
    #[must_use]
    pub fn field(&self) -> &'static str {
        self.kind.field()
    }
}

/// Current readings of every resolvable source, in rule order.
#[derive(Debug, Clone, Default)]
pub struct Readings {
    /// Binary rain sensors, in configuration order.
    pub sensors: Vec<Device>,
    /// Weather feeds, in [`FeedRole::ALL`] order.
    pub feeds: Vec<(FeedRole, Device)>,
}

#[derive(Debug, Default)]
pub struct SourceRegistry {
    sensors: Vec<SourceBinding>,
    feeds: Vec<(FeedRole, SourceBinding)>,
    subscriptions: Vec<Subscription>,
}

impl SourceRegistry {
    /// Resolve the configured sensors and discovered feeds, then subscribe
    /// to each of them, forwarding changes to `sender`.
    ///
    /// # Errors
    ///
    /// Returns an error when the bus cannot be listed or refuses a
    /// subscription. Subscriptions made before the failure are released.
    #[tracing::instrument(skip_all, fields(sensors = sensors.len()))]
    pub async fn bind<B: DeviceBus>(
        bus: &B,
        sensors: &[DeviceId],
        sender: &mpsc::UnboundedSender<SourceChanged>,
    ) -> Result<Self, RainHubError> {
        let devices = bus.list().await?;

        let mut registry = Self::default();
        for id in sensors {
            if registry.sensors.iter().any(|binding| &binding.id == id) {
                continue;
            }
            if !devices.iter().any(|device| &device.id == id) {
                tracing::warn!(device = %id, "rain sensor not registered yet");
            }
            registry.sensors.push(SourceBinding {
                id: id.clone(),
                kind: SourceKind::BinarySensor,
            });
        }
        for role in FeedRole::ALL {
            let found = devices.iter().find(|device| {
                device.kind == DeviceKind::SensorMultilevel
                    && device.probe.as_deref() == Some(role.probe())
            });
            if let Some(device) = found {
                tracing::debug!(device = %device.id, ?role, "weather feed bound");
                registry.feeds.push((
                    role,
                    SourceBinding {
                        id: device.id.clone(),
                        kind: role.into(),
                    },
                ));
            }
        }

        let bindings: Vec<SourceBinding> = registry.bindings().cloned().collect();
        for binding in bindings {
            // on error `registry` drops, releasing what was already subscribed
            let subscription = bus.subscribe(&binding.id, binding.field(), sender.clone())?;
            registry.subscriptions.push(subscription);
        }
        Ok(registry)
    }

    /// Every binding, sensors first then feeds in rule order.
    pub fn bindings(&self) -> impl Iterator<Item = &SourceBinding> {
        self.sensors
            .iter()
            .chain(self.feeds.iter().map(|(_, binding)| binding))
    }

    pub fn sensors(&self) -> impl Iterator<Item = &SourceBinding> {
        self.sensors.iter()
    }

    #[must_use]
    pub fn feed(&self, role: FeedRole) -> Option<&SourceBinding> {
        self.feeds
            .iter()
            .find(|(bound, _)| *bound == role)
            .map(|(_, binding)| binding)
    }

    /// Whether a change notification concerns one of the bound sources.
    #[must_use]
    pub fn is_bound(&self, change: &SourceChanged) -> bool {
        self.bindings()
            .any(|binding| binding.id == change.device && binding.field() == change.field)
    }

    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Read the current state of every bound source.
    ///
    /// Sources that can no longer be resolved are skipped.
    pub async fn read<B: DeviceBus>(&self, bus: &B) -> Readings {
        let mut readings = Readings::default();
        for binding in &self.sensors {
            if let Some(device) = resolve(bus, binding).await {
                readings.sensors.push(device);
            }
        }
        for (role, binding) in &self.feeds {
            if let Some(device) = resolve(bus, binding).await {
                readings.feeds.push((*role, device));
            }
        }
        readings
    }

    /// Release every subscription. Returns how many were released.
    pub fn release(&mut self) -> usize {
        let count = self.subscriptions.len();
        self.subscriptions.clear();
        count
    }
}

async fn resolve<B: DeviceBus>(bus: &B, binding: &SourceBinding) -> Option<Device> {
    match bus.get(&binding.id).await {
        Ok(device) => Some(device),
        Err(err) => {
            tracing::warn!(device = %binding.id, kind = ?binding.kind, error = %err, "source not resolvable, skipping");
            None
        }
    }
}
