//! The engine actor: one task per engine that owns every piece of state.
//!
//! Source changes, the `update` command, the safety sweep, the cooldown
//! timer and the poll timer all converge on a single `select!` loop, so
//! evaluations never interleave. Readers observe the state through a
//! [`watch`] channel.

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use rainhub_domain::config::RainConfig;
use rainhub_domain::device::{AttributeValue, Device, DeviceKind, Level};
use rainhub_domain::error::{RainHubError, SchedulingError};
use rainhub_domain::event::{Event, EventType};
use rainhub_domain::rain::{RAIN_PROBE, RainState, metric};
use rainhub_domain::time::Timestamp;

use super::evaluator::ConditionEvaluator;
use super::gate::NotificationGate;
use super::hysteresis::{HysteresisController, Transition};
use super::poll::PollScheduler;
use super::registry::SourceRegistry;
use crate::ports::{Clock, DeviceBus, EventPublisher, Notifier, RainStateStore, SourceChanged};

const COMMAND_CAPACITY: usize = 16;

/// Collaborators injected into an engine.
#[derive(Debug, Clone)]
pub struct EnginePorts<B, P, N, S, C> {
    pub bus: B,
    pub publisher: P,
    pub notifier: N,
    pub store: S,
    pub clock: C,
}

#[derive(Debug)]
enum Command {
    Update,
    Shutdown(oneshot::Sender<()>),
}

#[derive(Debug)]
enum Trigger {
    Start,
    Source(SourceChanged),
    Sweep,
    Update,
}

/// Cloneable access to a running engine.
#[derive(Debug, Clone)]
pub struct RainControl {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<RainState>,
}

impl RainControl {
    /// Force an immediate re-evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::NotRunning`] once the engine has stopped.
    pub async fn update(&self) -> Result<(), RainHubError> {
        self.commands
            .send(Command::Update)
            .await
            .map_err(|_| SchedulingError::NotRunning)?;
        Ok(())
    }

    /// Latest published state.
    #[must_use]
    pub fn state(&self) -> RainState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RainState> {
        self.state.clone()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }
}

/// Owner handle of a running engine.
#[derive(Debug)]
pub struct RainHandle {
    control: RainControl,
    task: JoinHandle<()>,
}

impl RainHandle {
    #[must_use]
    pub fn control(&self) -> RainControl {
        self.control.clone()
    }

    /// Stop the engine and wait until it released its resources.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::NotRunning`] when the engine task already
    /// ended on its own.
    pub async fn shutdown(self) -> Result<(), RainHubError> {
        let (ack, acked) = oneshot::channel();
        self.control
            .commands
            .send(Command::Shutdown(ack))
            .await
            .map_err(|_| SchedulingError::NotRunning)?;
        acked.await.map_err(|_| SchedulingError::NotRunning)?;
        self.task.await.map_err(|_| SchedulingError::NotRunning)?;
        Ok(())
    }
}

pub struct RainEngine<B, P, N, S, C> {
    config: RainConfig,
    ports: EnginePorts<B, P, N, S, C>,
    registry: SourceRegistry,
    evaluator: ConditionEvaluator,
    controller: HysteresisController,
    poll: PollScheduler,
    gate: NotificationGate,
    sweep: Interval,
    changes: mpsc::UnboundedReceiver<SourceChanged>,
    commands: mpsc::Receiver<Command>,
    state: watch::Sender<RainState>,
}

impl<B, P, N, S, C> RainEngine<B, P, N, S, C>
where
    B: DeviceBus + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
    S: RainStateStore + Send + Sync + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Restore the persisted state, bind the sources, run a first
    /// evaluation and spawn the actor.
    ///
    /// # Errors
    ///
    /// Returns [`RainHubError::Validation`] for an invalid configuration,
    /// or the error of the store or bus when they cannot be read.
    #[tracing::instrument(skip_all, fields(engine = %config.id))]
    pub async fn start(
        config: RainConfig,
        ports: EnginePorts<B, P, N, S, C>,
    ) -> Result<RainHandle, RainHubError> {
        config.validate()?;

        let now = ports.clock.now();
        let persisted = ports.store.load(&config.id).await?.unwrap_or_default();
        let (controller, resumed) =
            HysteresisController::resume(persisted.clone(), config.cooldown(), now);
        tracing::info!(transition = ?resumed, level = %controller.state().level, "rain state restored");

        let (changes_tx, changes) = mpsc::unbounded_channel();
        let registry = SourceRegistry::bind(&ports.bus, &config.rain_sensors, &changes_tx).await?;
        let (commands_tx, commands) = mpsc::channel(COMMAND_CAPACITY);
        let (state, state_rx) = watch::channel(controller.state().clone());

        let period = config.sweep_interval();
        let first = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
        let mut sweep = interval_at(first, period);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut engine = Self {
            evaluator: ConditionEvaluator::from_config(&config),
            poll: PollScheduler::new(config.poll_interval()),
            gate: NotificationGate::from_config(&config),
            config,
            ports,
            registry,
            controller,
            sweep,
            changes,
            commands,
            state,
        };

        engine.commit(resumed, &persisted, now).await;
        engine.publish_device().await;
        engine.evaluate(Trigger::Start).await;
        let probability = engine.controller.state().precipitation_probability;
        if let Some(interval) = engine.poll.schedule(probability) {
            tracing::debug!(?interval, "first sensor poll scheduled");
        }

        let control = RainControl {
            commands: commands_tx,
            state: state_rx,
        };
        let task = tokio::spawn(engine.run());
        Ok(RainHandle { control, task })
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Update) => self.evaluate(Trigger::Update).await,
                    Some(Command::Shutdown(ack)) => {
                        self.stop().await;
                        let _ = ack.send(());
                        return;
                    }
                    None => {
                        self.stop().await;
                        return;
                    }
                },
                Some(change) = self.changes.recv() => {
                    if self.registry.is_bound(&change) {
                        self.evaluate(Trigger::Source(change)).await;
                    }
                }
                _ = self.sweep.tick() => self.evaluate(Trigger::Sweep).await,
                () = self.controller.cooldown_elapsed() => self.expire_cooldown().await,
                () = self.poll.elapsed() => self.poll_sensors().await,
            }
        }
    }

    async fn evaluate(&mut self, trigger: Trigger) {
        let readings = self.registry.read(&self.ports.bus).await;
        let verdict = self.evaluator.evaluate(&readings);
        tracing::debug!(
            ?trigger,
            rain = verdict.rain,
            sources = verdict.sources.len(),
            probability = ?verdict.probability,
            "evaluated"
        );

        let now = self.ports.clock.now();
        let previous = self.controller.state().clone();
        let transition = self.controller.apply(verdict, now);
        self.commit(transition, &previous, now).await;
    }

    async fn expire_cooldown(&mut self) {
        let now = self.ports.clock.now();
        let previous = self.controller.state().clone();
        let transition = self.controller.expire();
        self.commit(transition, &previous, now).await;
    }

    async fn poll_sensors(&mut self) {
        for binding in self.registry.sensors() {
            if let Err(err) = self.ports.bus.refresh(&binding.id).await {
                tracing::warn!(device = %binding.id, error = %err, "sensor refresh failed");
            }
        }
        let probability = self.controller.state().precipitation_probability;
        if let Some(interval) = self.poll.schedule(probability) {
            tracing::debug!(?interval, ?probability, "next sensor poll scheduled");
        }
    }

    /// Emit the side effects of a transition and publish the new state.
    async fn commit(&mut self, transition: Transition, previous: &RainState, now: Timestamp) {
        if transition != Transition::Unchanged {
            tracing::info!(?transition, sources = ?self.controller.state().sources, "rain transition");
        }

        let event_type = match transition {
            Transition::Started => Some(EventType::RainStart),
            Transition::Stopped => Some(EventType::RainStop),
            _ => None,
        };
        if let Some(event_type) = event_type {
            let event = Event::new(
                event_type,
                Some(self.config.id.clone()),
                event_data(&self.config, self.controller.state()),
            )
            .at(now);
            if let Err(err) = self.ports.publisher.publish(event).await {
                tracing::warn!(error = %err, %event_type, "failed to publish event");
            }
        }

        if transition == Transition::Started {
            self.raise_alarm(now).await;
        }

        let state = self.controller.state().clone();
        if &state == previous {
            return;
        }
        if let Err(err) = self.ports.store.save(&self.config.id, &state).await {
            tracing::error!(error = %err, "failed to persist rain state");
        }
        self.publish_device().await;
        self.state.send_replace(state);
    }

    async fn raise_alarm(&self, now: Timestamp) {
        let Some(alarm) = self.gate.inspect(&self.ports.bus).await else {
            return;
        };
        tracing::warn!(message = %alarm.notification.message, "rain started with openings open");
        if let Err(err) = self.ports.notifier.notify(alarm.notification).await {
            tracing::warn!(error = %err, "failed to deliver rain alarm");
        }
        if let Err(err) = self.ports.publisher.publish(alarm.event.at(now)).await {
            tracing::warn!(error = %err, "failed to publish rain alarm");
        }
    }

    async fn publish_device(&self) {
        let result = match engine_device(&self.config, self.controller.state()) {
            Ok(device) => self.ports.bus.upsert(device).await,
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to publish rain device");
        }
    }

    /// Release subscriptions and withdraw the engine device. Timers drop
    /// with the actor; a running cooldown stays persisted for the next start.
    async fn stop(&mut self) {
        self.poll.cancel();
        let released = self.registry.release();
        if let Err(err) = self.ports.bus.remove(&self.config.id).await {
            tracing::warn!(error = %err, "failed to remove rain device");
        }
        tracing::info!(released, deadline = ?self.controller.deadline(), "rain engine stopped");
    }
}

fn event_data(config: &RainConfig, state: &RainState) -> serde_json::Value {
    serde_json::json!({
        "id": config.id,
        "title": config.name,
        "location": config.location,
        "sources": state.sources,
        "last_rain": state.last_rain.map(|ts| ts.timestamp()),
        "pop": state.precipitation_probability,
    })
}

/// The device an engine publishes about itself.
fn engine_device(config: &RainConfig, state: &RainState) -> Result<Device, RainHubError> {
    let sources: Vec<String> = state.sources.iter().map(ToString::to_string).collect();
    let mut builder = Device::builder()
        .id(config.id.clone())
        .name(config.name.clone())
        .kind(DeviceKind::Virtual)
        .probe(RAIN_PROBE)
        .level(Level::from(state.level.is_on()))
        .metric(metric::ICON, state.phase().indicator().icon())
        .metric(
            metric::RAIN,
            AttributeValue::String(state.rain_flag.to_string()),
        )
        .metric(metric::SOURCES, AttributeValue::Json(sources.into()));
    if let Some(last_rain) = state.last_rain {
        builder = builder.metric(metric::LAST_RAIN, last_rain.timestamp());
    }
    if let Some(pop) = state.precipitation_probability {
        builder = builder.metric(metric::POP, pop);
    }
    if let Some(deadline) = state.pending_deadline {
        builder = builder.metric(metric::TIMEOUT, deadline.timestamp());
    }
    builder.build()
}
