use axum::extract::State;
use axum::{routing::get, Json, Router};

use envmon_core::thresholds::ThresholdBands;

use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/thresholds
async fn list_thresholds(State(state): State<AppState>) -> Json<DataResponse<ThresholdBands>> {
    Json(DataResponse {
        data: (*state.bands).clone(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/thresholds", get(list_thresholds))
}
