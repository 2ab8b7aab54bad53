//! End-to-end smoke tests for the full rainhubd stack.
//!
//! Each test spins up the complete application (in-memory `SQLite`, virtual
//! device bus, real rain engine, real axum router) and exercises it via
//! `tower::ServiceExt::oneshot`, without binding a TCP port.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use rainhub_adapter_http_axum::router;
use rainhub_adapter_http_axum::state::AppState;
use rainhub_adapter_storage_sqlite_sqlx::{Config, SqliteRainStateStore};
use rainhub_adapter_virtual::{
    OpeningConfig, RainSensorConfig, VirtualDeviceBus, VirtualDeviceConfig, WeatherFeedConfig,
};
use rainhub_app::engine::EnginePorts;
use rainhub_app::event_bus::InProcessEventBus;
use rainhub_app::ports::{Module, Notifier, RainStateStore, SystemClock};
use rainhub_app::services::rain_service::RainService;
use rainhub_domain::config::RainConfig;
use rainhub_domain::device::Level;
use rainhub_domain::error::RainHubError;
use rainhub_domain::event::{Event, EventType};
use rainhub_domain::id::DeviceId;
use rainhub_domain::notification::Notification;
use rainhub_domain::rain::{RainLevel, RainState};
use rainhub_domain::weather::FeedRole;
use tokio::sync::broadcast;
use tower::ServiceExt;

#[derive(Default)]
struct RecordingNotifier(Mutex<Vec<Notification>>);

impl RecordingNotifier {
    fn messages(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), RainHubError> {
        self.0.lock().unwrap().push(notification);
        Ok(())
    }
}

type Service = RainService<
    VirtualDeviceBus,
    Arc<InProcessEventBus>,
    Arc<RecordingNotifier>,
    SqliteRainStateStore,
    SystemClock,
>;

struct Stack {
    bus: VirtualDeviceBus,
    events: Arc<InProcessEventBus>,
    notifier: Arc<RecordingNotifier>,
    store: SqliteRainStateStore,
}

impl Stack {
    async fn new(window_open: bool) -> Self {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .expect("in-memory database should initialise");

        let bus = VirtualDeviceBus::from_configs(&[
            VirtualDeviceConfig::RainSensor(RainSensorConfig {
                id: DeviceId::from("s1"),
                name: "Roof sensor".to_string(),
                area: None,
                on: false,
            }),
            VirtualDeviceConfig::Opening(OpeningConfig {
                id: DeviceId::from("w1"),
                name: "Kitchen window".to_string(),
                area: None,
                open: window_open,
            }),
            VirtualDeviceConfig::Weather(WeatherFeedConfig {
                id: DeviceId::from("owm"),
                name: "Condition code".to_string(),
                role: FeedRole::ConditionCode,
                metrics: std::collections::HashMap::new(),
            }),
        ])
        .expect("virtual devices should register");

        Self {
            bus,
            events: Arc::new(InProcessEventBus::new(64)),
            notifier: Arc::new(RecordingNotifier::default()),
            store: SqliteRainStateStore::new(db.pool().clone()),
        }
    }

    fn service(&self) -> Service {
        RainService::new(
            RainConfig {
                rain_sensors: vec![DeviceId::from("s1")],
                openings: vec![DeviceId::from("w1")],
                cooldown_minutes: Some(10),
                ..RainConfig::default()
            },
            EnginePorts {
                bus: self.bus.clone(),
                publisher: Arc::clone(&self.events),
                notifier: Arc::clone(&self.notifier),
                store: self.store.clone(),
                clock: SystemClock,
            },
        )
    }

    fn wet(&self, level: Level) {
        self.bus.set_level(&DeviceId::from("s1"), level).unwrap();
    }
}

async fn started(stack: &Stack) -> (Service, axum::Router) {
    let mut service = stack.service();
    service.init().await.unwrap();
    let control = service.control().unwrap();
    let app = router::build(AppState::new(service.config().clone(), control));
    (service, app)
}

async fn wait_for(service: &Service, predicate: impl FnMut(&RainState) -> bool) {
    let mut changes = service.control().unwrap().subscribe();
    tokio::time::timeout(Duration::from_secs(5), changes.wait_for(predicate))
        .await
        .expect("state should change in time")
        .unwrap();
}

async fn next_event(events: &mut broadcast::Receiver<Event>) -> Event {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("event should arrive in time")
        .unwrap()
}

async fn get_json(app: &axum::Router, uri: &str) -> serde_json::Value {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let stack = Stack::new(false).await;
    let (_service, app) = started(&stack).await;

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Rain detection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_start_dry() {
    let stack = Stack::new(false).await;
    let (_service, app) = started(&stack).await;

    let json = get_json(&app, "/api/rain").await;

    assert_eq!(json["phase"], "off");
    assert_eq!(json["state"]["level"], "off");
}

#[tokio::test]
async fn should_turn_on_and_persist_when_sensor_gets_wet() {
    let stack = Stack::new(false).await;
    let mut events = stack.events.subscribe();
    let (service, app) = started(&stack).await;

    stack.wet(Level::On);
    wait_for(&service, |state| state.level.is_on()).await;

    let json = get_json(&app, "/api/rain").await;
    assert_eq!(json["phase"], "active");
    assert_eq!(json["state"]["sources"], serde_json::json!(["s1:level"]));

    let event = next_event(&mut events).await;
    assert_eq!(event.event_type, EventType::RainStart);

    let saved = stack
        .store
        .load(&DeviceId::from("rain"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.level, RainLevel::On);
    assert!(saved.last_rain.is_some());
    assert!(stack.notifier.messages().is_empty());
}

#[tokio::test]
async fn should_detect_rain_from_condition_code() {
    let stack = Stack::new(false).await;
    let (service, app) = started(&stack).await;

    stack
        .bus
        .set_metric(&DeviceId::from("owm"), "condition_code", 500_i64)
        .unwrap();
    wait_for(&service, |state| state.level.is_on()).await;

    let json = get_json(&app, "/api/rain").await;
    assert_eq!(
        json["state"]["sources"],
        serde_json::json!(["owm:condition_code"])
    );
}

#[tokio::test]
async fn should_raise_alarm_when_rain_starts_with_window_open() {
    let stack = Stack::new(true).await;
    let mut events = stack.events.subscribe();
    let (service, _app) = started(&stack).await;

    stack.wet(Level::On);
    wait_for(&service, |state| state.level.is_on()).await;

    assert_eq!(
        next_event(&mut events).await.event_type,
        EventType::RainStart
    );
    let alarm = next_event(&mut events).await;
    assert_eq!(alarm.event_type, EventType::SecurityRainAlarm);
    assert_eq!(
        stack.notifier.messages(),
        vec!["Rain detected while open: Kitchen window".to_string()]
    );
}

#[tokio::test]
async fn should_enter_cooldown_when_sensor_dries() {
    let stack = Stack::new(false).await;
    let (service, app) = started(&stack).await;
    stack.wet(Level::On);
    wait_for(&service, |state| state.level.is_on()).await;

    stack.wet(Level::Off);
    wait_for(&service, |state| !state.rain_flag.is_on()).await;

    let json = get_json(&app, "/api/rain").await;
    assert_eq!(json["phase"], "cooldown");
    assert_eq!(json["icon"], "icon_timeout.png");
    assert!(json["state"]["pending_deadline"].is_i64());
}

#[tokio::test]
async fn should_resume_cooldown_after_restart() {
    let stack = Stack::new(false).await;
    let (mut service, _app) = started(&stack).await;
    stack.wet(Level::On);
    wait_for(&service, |state| state.level.is_on()).await;
    service.shutdown().await.unwrap();

    stack.wet(Level::Off);
    let (_service, app) = started(&stack).await;

    let json = get_json(&app, "/api/rain").await;
    assert_eq!(json["state"]["level"], "on");
    assert_eq!(json["phase"], "cooldown");
}

#[tokio::test]
async fn should_accept_update_request() {
    let stack = Stack::new(false).await;
    let (_service, app) = started(&stack).await;

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/rain/update")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::ACCEPTED);
}
