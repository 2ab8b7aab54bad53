//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod rain;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rain", get(rain::get))
        .route("/rain/config", get(rain::config))
        .route("/rain/update", post(rain::update))
}
