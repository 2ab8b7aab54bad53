//! Application services: lifecycle wrappers the daemon hosts.

pub mod rain_service;

pub use rain_service::RainService;
