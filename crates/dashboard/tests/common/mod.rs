#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::{mpsc, watch};
use tower::ServiceExt;

use envmon_core::config::MonitorConfig;
use envmon_core::mqtt::{MqttSettings, DEFAULT_TOPIC};
use envmon_core::reading::SensorSample;
use envmon_dashboard::config::ServerConfig;
use envmon_dashboard::refresher::Refresher;
use envmon_dashboard::router::build_app_router;
use envmon_dashboard::state::AppState;
use envmon_dashboard::ws::WsManager;

/// Build a test `ServerConfig` with a small, unseeded series.
pub fn test_config() -> ServerConfig {
    let mut monitor = MonitorConfig::with_interval(Duration::from_secs(1));
    monitor.series_capacity = 5;
    monitor.seed_series = false;

    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        monitor,
        mqtt: MqttSettings {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "envmon-test".to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            tls: None,
        },
    }
}

/// Everything a route test needs: the router, the refresher that feeds it
/// and the inbound queue standing in for the MQTT subscriber.
pub struct TestApp {
    pub app: Router,
    pub refresher: Refresher,
    pub inbound: mpsc::Sender<SensorSample>,
    pub ws_manager: Arc<WsManager>,
}

/// Build the full application router with all middleware layers, wired to
/// a refresher the test drives by hand.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let ws_manager = Arc::new(WsManager::new());
    let (inbound, inbound_rx) = mpsc::channel(8);
    let (latest_tx, latest_rx) = watch::channel(None);

    let refresher = Refresher::new(&config.monitor, inbound_rx, latest_tx, Arc::clone(&ws_manager))
        .expect("test monitor config is valid");

    let state = AppState {
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        latest: latest_rx,
        bands: Arc::new(config.monitor.bands.clone()),
    };

    TestApp {
        app: build_app_router(state, &config).expect("test CORS origins are valid"),
        refresher,
        inbound,
        ws_manager,
    }
}

/// Every channel inside its default band; air quality 99.9.
pub fn comfortable_sample() -> SensorSample {
    SensorSample::new(21.0, 1013.0, 40.0, 60_000.0, 90.0)
}

/// Gas below its band (the first channel to trip); air quality 58.2.
pub fn stuffy_sample() -> SensorSample {
    SensorSample::new(21.37, 1013.4, 45.26, 23_600.0, 42.0)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request"),
    )
    .await
    .expect("router is infallible")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}
