use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use envmon_core::types::Timestamp;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` once a cycle has completed, `starting` before.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub last_cycle_at: Option<Timestamp>,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let last_cycle_at = state.current().map(|output| output.timestamp);

    Json(HealthResponse {
        status: if last_cycle_at.is_some() { "ok" } else { "starting" },
        version: env!("CARGO_PKG_VERSION"),
        last_cycle_at,
    })
}

/// Mount health check routes (root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
