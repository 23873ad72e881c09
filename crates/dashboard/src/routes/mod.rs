pub mod health;
pub mod readings;
pub mod thresholds;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws                       WebSocket live feed
/// /readings/current         newest cycle output
/// /readings/series          rolling window (?channel=)
/// /thresholds               configured warning bands
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/readings", readings::router())
        .merge(thresholds::router())
}
