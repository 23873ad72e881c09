//! `envmon-station` -- home environment monitoring daemon.
//!
//! Polls the BME680 (through the kernel IIO driver) and the particle
//! sensor once per cycle, scores air quality, checks every channel
//! against its warning band, renders the LED page and publishes the
//! reading to the MQTT broker.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default                            | Description                        |
//! |------------------------|----------|------------------------------------|------------------------------------|
//! | `CYCLE_INTERVAL_SECS`  | no       | `1`                                | Seconds between cycles             |
//! | `SERIES_CAPACITY`      | no       | `100`                              | Rolling window width               |
//! | `BME680_IIO_DIR`       | no       | `/sys/bus/iio/devices/iio:device0` | Sensor sysfs directory             |
//! | `SMOKE_SENSOR_PATH`    | no       | --                                 | File holding the particle count    |
//! | `DISPLAY_PAGE`         | no       | `TEMP`                             | Initial LED page                   |
//! | `MQTT_ENABLED`         | no       | `true`                             | `false` runs without a broker      |
//! | `MQTT_HOST`            | yes*     | --                                 | *when publishing is enabled        |
//!
//! On Unix, `SIGUSR1` is the trackball's short press: it advances the
//! LED page.

use std::time::Duration;

use envmon_core::cycle::MonitoringCycle;
use envmon_station::collector::IioSensorSource;
use envmon_station::config::StationConfig;
use envmon_station::console::ConsoleDisplay;
use envmon_station::publisher::{self, MqttPublisher};
use envmon_station::runner;

use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DISCONNECT_GRACE: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "envmon_station=info,envmon_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StationConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid station configuration");
        std::process::exit(1);
    });

    tracing::info!(
        interval_secs = config.monitor.cycle_interval.as_secs_f64(),
        series_capacity = config.monitor.series_capacity,
        iio_dir = %config.iio_dir.display(),
        mqtt = config.mqtt.is_some(),
        "Starting envmon-station",
    );

    let mut source = IioSensorSource::new(&config.iio_dir, config.smoke_path.clone());
    if !source.is_present() {
        tracing::warn!(
            iio_dir = %config.iio_dir.display(),
            "BME680 not found -- cycles will report zero readings",
        );
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (mqtt_stop_tx, mqtt_stop_rx) = watch::channel(false);

    let (mqtt, event_loop_handle) = match &config.mqtt {
        Some(settings) => {
            let (publisher, event_loop) = MqttPublisher::connect(settings).unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to configure MQTT publisher");
                std::process::exit(1);
            });
            let handle =
                tokio::spawn(publisher::drive_event_loop(event_loop, mqtt_stop_rx));
            (Some(publisher), Some(handle))
        }
        None => {
            tracing::info!("MQTT publishing disabled");
            (None, None)
        }
    };

    let mut cycle = MonitoringCycle::new(&config.monitor, chrono::Utc::now()).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to initialise monitoring cycle");
        std::process::exit(1);
    });

    let mut sink = (ConsoleDisplay::new(config.display_page), mqtt);

    #[cfg(unix)]
    tokio::spawn(forward_page_presses(sink.0.button()));

    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    runner::run(
        &mut cycle,
        &mut source,
        &mut sink,
        config.monitor.cycle_interval,
        shutdown_rx,
    )
    .await;

    // --- Post-shutdown cleanup ---
    tracing::info!(indicator = ?envmon_core::indicator::IndicatorColor::Off, "Indicator off");

    if let Some(publisher) = &sink.1 {
        tracing::info!(
            published = publisher.published(),
            dropped = publisher.dropped(),
            "Disconnecting from MQTT broker",
        );
        publisher.disconnect().await;
        // Let the event loop flush the DISCONNECT packet.
        tokio::time::sleep(DISCONNECT_GRACE).await;
    }
    let _ = mqtt_stop_tx.send(true);
    if let Some(handle) = event_loop_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    tracing::info!("Shutdown complete");
}

/// Press the page button on every SIGUSR1.
#[cfg(unix)]
async fn forward_page_presses(button: envmon_station::console::PageButton) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut presses = match signal(SignalKind::user_defined1()) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(error = %e, "Page button signal unavailable");
            return;
        }
    };
    while presses.recv().await.is_some() {
        button.press();
    }
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
            tracing::info!("Received SIGINT (Ctrl-C), stopping");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, stopping");
        }
    }
}
