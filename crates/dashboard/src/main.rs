//! `envmon-dashboard` -- live view of the environment station.
//!
//! Subscribes to the station's MQTT topic, re-runs the monitoring cycle
//! on the received samples and serves the result over HTTP and a
//! WebSocket feed.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use envmon_dashboard::config::ServerConfig;
use envmon_dashboard::refresher::Refresher;
use envmon_dashboard::state::AppState;
use envmon_dashboard::{router, subscriber, ws};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "envmon_dashboard=info,envmon_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid dashboard configuration");
        std::process::exit(1);
    });
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // --- WebSocket manager ---
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));

    // --- MQTT intake ---
    let (client, event_loop) = subscriber::connect(&config.mqtt).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to configure MQTT subscriber");
        std::process::exit(1);
    });
    let (inbound_tx, inbound_rx) = mpsc::channel(subscriber::INBOUND_CAPACITY);
    let subscriber_handle = tokio::spawn(subscriber::run(
        client,
        event_loop,
        config.mqtt.topic.clone(),
        inbound_tx,
        shutdown_rx.clone(),
    ));

    // --- Refresher ---
    let (latest_tx, latest_rx) = watch::channel(None);
    let refresher = Refresher::new(&config.monitor, inbound_rx, latest_tx, Arc::clone(&ws_manager))
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to initialise monitoring cycle");
            std::process::exit(1);
        });
    let refresher_handle = tokio::spawn(refresher.run(config.monitor.cycle_interval, shutdown_rx));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        latest: latest_rx,
        bands: Arc::new(config.monitor.bands.clone()),
    };

    let app = router::build_app_router(state, &config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid HTTP configuration");
        std::process::exit(1);
    });

    // --- Start server ---
    let ip: IpAddr = config.host.parse().unwrap_or_else(|e| {
        tracing::error!(error = %e, host = %config.host, "Invalid HOST address");
        std::process::exit(1);
    });
    let addr = SocketAddr::new(ip, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, %addr, "Failed to bind to address");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
    }

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let _ = shutdown_tx.send(true);
    let _ = tokio::time::timeout(Duration::from_secs(5), refresher_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), subscriber_handle).await;

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;
    heartbeat_handle.abort();

    tracing::info!("Shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
