//! In-process event bus for rain events, plus the logger that records them.

use std::future::Future;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use rainhub_domain::error::RainHubError;
use rainhub_domain::event::{Event, EventType};

use crate::ports::EventPublisher;

/// Fan-out of rain events over a tokio [`broadcast`] channel.
///
/// Publishing succeeds without subscribers; the event is dropped.
pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl InProcessEventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events published *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Spawn a task that logs every event published from now on.
    ///
    /// The task ends once the bus is dropped and yields how many events it
    /// logged.
    #[must_use]
    pub fn spawn_logger(&self) -> JoinHandle<usize> {
        tokio::spawn(log_events(self.subscribe()))
    }
}

/// Log events until the channel closes. Alarms are logged at `warn`.
pub async fn log_events(mut events: broadcast::Receiver<Event>) -> usize {
    let mut logged = 0;
    loop {
        match events.recv().await {
            Ok(event) => {
                log_event(&event);
                logged += 1;
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event log lagged, some rain events were dropped");
            }
            Err(broadcast::error::RecvError::Closed) => return logged,
        }
    }
}

fn log_event(event: &Event) {
    match event.event_type {
        EventType::SecurityRainAlarm => tracing::warn!(
            event_type = %event.event_type,
            source = ?event.source,
            data = %event.data,
            "rain alarm"
        ),
        EventType::RainStart | EventType::RainStop => tracing::info!(
            event_type = %event.event_type,
            source = ?event.source,
            data = %event.data,
            "rain event"
        ),
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), RainHubError>> + Send {
        tracing::trace!(event_type = %event.event_type, "publishing event");
        // send only fails when nobody listens
        let _ = self.sender.send(event);
        async { Ok(()) }
    }
}
