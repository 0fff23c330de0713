use axum::{extract::State, response::Redirect, Json};
use serde::Serialize;
use std::sync::Arc;
use ticketd_core::Config;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Config> {
    Json(state.config().clone())
}

/// Root redirect. There is no bundled docs UI, so this points at the health
/// endpoint.
pub async fn root() -> Redirect {
    Redirect::permanent("/api/v1/health")
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    crate::metrics::collect_ticket_metrics(state.as_ref());
    crate::metrics::encode_metrics()
}
