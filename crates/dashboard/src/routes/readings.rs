//! Reading endpoints, served from the refresher's latest snapshot.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use envmon_core::air_quality::AirQualityBand;
use envmon_core::channel::Channel;
use envmon_core::cycle::CycleOutput;
use envmon_core::indicator::IndicatorState;
use envmon_core::reading::Reading;
use envmon_core::thresholds::WarningState;
use envmon_core::types::Timestamp;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CurrentReading<'a> {
    pub timestamp: Timestamp,
    pub reading: Reading,
    pub sensor_ok: bool,
    pub warnings: &'a WarningState,
    pub indicator: IndicatorState,
    pub air_quality_band: AirQualityBand,
}

#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    pub channel: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChannelPoint {
    pub timestamp: Timestamp,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct ChannelSeries {
    pub channel: Channel,
    pub points: Vec<ChannelPoint>,
}

fn latest(state: &AppState) -> AppResult<Arc<CycleOutput>> {
    state
        .current()
        .ok_or_else(|| AppError::NoData("no monitoring cycle has completed yet".to_string()))
}

/// GET /api/v1/readings/current
async fn current(State(state): State<AppState>) -> AppResult<Response> {
    let output = latest(&state)?;
    let body = DataResponse {
        data: CurrentReading {
            timestamp: output.timestamp,
            reading: output.reading,
            sensor_ok: output.sensor_ok,
            warnings: &output.warnings,
            indicator: output.indicator,
            air_quality_band: output.air_quality_band(),
        },
    };
    Ok(Json(body).into_response())
}

/// GET /api/v1/readings/series[?channel=<name>]
async fn series(
    State(state): State<AppState>,
    Query(query): Query<SeriesQuery>,
) -> AppResult<Response> {
    // Validate the channel before looking at data so a bad request is a
    // 400 even during startup.
    let channel = query.channel.as_deref().map(str::parse::<Channel>).transpose()?;
    let output = latest(&state)?;

    let response = match channel {
        None => Json(DataResponse {
            data: &output.series,
        })
        .into_response(),
        Some(channel) => Json(DataResponse {
            data: ChannelSeries {
                channel,
                points: output
                    .series
                    .iter()
                    .map(|p| ChannelPoint {
                        timestamp: p.timestamp,
                        value: p.reading.value(channel),
                    })
                    .collect(),
            },
        })
        .into_response(),
    };
    Ok(response)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/current", get(current))
        .route("/series", get(series))
}
