//! # rainhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a small JSON API over one running rain engine
//!   (`/api/rain`, `/api/rain/config`, `/api/rain/update`)
//! - Map HTTP requests into [`RainControl`](rainhub_app::engine::RainControl)
//!   calls (driving adapter)
//! - Map [`RainHubError`](rainhub_domain::error::RainHubError) into status codes
//!
//! ## Dependency rule
//! Depends on `rainhub-app` (for the engine control) and `rainhub-domain`
//! (for response types). Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
mod test_support;
