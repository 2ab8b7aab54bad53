//! JSON REST handlers for the rain engine.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use rainhub_domain::config::RainConfig;
use rainhub_domain::id::DeviceId;
use rainhub_domain::rain::{Indicator, RainPhase, RainState};

use crate::error::ApiError;
use crate::state::AppState;

/// Current state of the engine together with its derived presentation.
#[derive(Debug, Serialize)]
pub struct RainView {
    pub id: DeviceId,
    pub name: String,
    pub phase: RainPhase,
    pub indicator: Indicator,
    pub icon: &'static str,
    pub state: RainState,
}

impl RainView {
    fn new(config: &RainConfig, state: RainState) -> Self {
        let phase = state.phase();
        let indicator = phase.indicator();
        Self {
            id: config.id.clone(),
            name: config.name.clone(),
            phase,
            indicator,
            icon: indicator.icon(),
            state,
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<RainView>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the update endpoint.
pub enum UpdateResponse {
    Accepted,
}

impl IntoResponse for UpdateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted => StatusCode::ACCEPTED.into_response(),
        }
    }
}

/// `GET /api/rain`
pub async fn get(State(state): State<AppState>) -> GetResponse {
    let current = state.control.state();
    GetResponse::Ok(Json(RainView::new(&state.config, current)))
}

/// `GET /api/rain/config`
pub async fn config(State(state): State<AppState>) -> Json<RainConfig> {
    Json(RainConfig::clone(&state.config))
}

/// `POST /api/rain/update`
///
/// Queues a re-evaluation and returns before it ran.
pub async fn update(State(state): State<AppState>) -> Result<UpdateResponse, ApiError> {
    state.control.update().await?;
    tracing::debug!(engine = %state.config.id, "update requested");
    Ok(UpdateResponse::Accepted)
}
