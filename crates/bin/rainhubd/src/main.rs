//! # rainhubd: rainhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`rainhub.toml`, env vars) and initialise logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Register the simulated devices on the virtual bus
//! - Start the rain engine, injecting its collaborators via port traits
//! - Build the axum router and serve it
//! - Handle graceful shutdown (SIGTERM/SIGINT), then stop the engine
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;
mod notifier;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use rainhub_adapter_http_axum::router;
use rainhub_adapter_http_axum::state::AppState;
use rainhub_adapter_storage_sqlite_sqlx::{Config as StorageConfig, SqliteRainStateStore};
use rainhub_adapter_virtual::VirtualDeviceBus;
use rainhub_app::engine::EnginePorts;
use rainhub_app::event_bus::InProcessEventBus;
use rainhub_app::ports::{Module, SystemClock};
use rainhub_app::services::rain_service::RainService;
use rainhub_domain::error::SchedulingError;

use crate::config::Config;
use crate::notifier::LogNotifier;

const EVENT_BUS_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let store = SqliteRainStateStore::new(db.pool().clone());

    // Devices
    let bus = VirtualDeviceBus::from_configs(&config.devices)?;
    tracing::info!(devices = config.devices.len(), "virtual devices registered");

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(EVENT_BUS_CAPACITY));
    let event_log = event_bus.spawn_logger();

    // Engine
    let mut rain = RainService::new(
        config.rain.clone(),
        EnginePorts {
            bus,
            publisher: Arc::clone(&event_bus),
            notifier: LogNotifier,
            store,
            clock: SystemClock,
        },
    );
    rain.init().await?;
    let control = rain.control().ok_or(SchedulingError::NotRunning)?;

    // HTTP
    let app = router::build(AppState::new(config.rain.clone(), control));
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "rainhubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down");
    rain.shutdown().await?;
    event_log.abort();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "unable to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
