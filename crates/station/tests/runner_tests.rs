//! Integration tests for the station's timer loop and console rendering.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{NaiveTime, Utc};
use tokio::sync::watch;

use envmon_core::channel::Channel;
use envmon_core::config::MonitorConfig;
use envmon_core::cycle::{CycleOutput, DisplaySink, MonitoringCycle, SensorSource};
use envmon_core::display::{Brightness, DisplayPage};
use envmon_core::error::SensorError;
use envmon_core::reading::SensorSample;
use envmon_station::config::StationConfig;
use envmon_station::console::ConsoleDisplay;
use envmon_station::runner;

struct SteadySource;

impl SensorSource for SteadySource {
    fn read(&mut self) -> Result<SensorSample, SensorError> {
        Ok(SensorSample::new(21.37, 1013.4, 45.26, 23_600.0, 42.0))
    }
}

/// Requests shutdown once it has seen `stop_after` cycles.
struct StoppingSink {
    seen: Vec<CycleOutput>,
    stop_after: usize,
    shutdown: watch::Sender<bool>,
}

impl DisplaySink for StoppingSink {
    fn present(&mut self, output: &CycleOutput) {
        self.seen.push(output.clone());
        if self.seen.len() == self.stop_after {
            let _ = self.shutdown.send(true);
        }
    }
}

fn test_config(capacity: usize) -> MonitorConfig {
    let mut config = MonitorConfig::with_interval(Duration::from_millis(5));
    config.series_capacity = capacity;
    config.seed_series = false;
    config
}

// ---------------------------------------------------------------------------
// Test: runner stops on shutdown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn runs_until_shutdown_is_requested() {
    let config = test_config(5);
    let mut cycle = MonitoringCycle::new(&config, Utc::now()).unwrap();
    let (tx, rx) = watch::channel(false);
    let mut sink = StoppingSink {
        seen: Vec::new(),
        stop_after: 3,
        shutdown: tx,
    };

    let completed = runner::run(
        &mut cycle,
        &mut SteadySource,
        &mut sink,
        config.cycle_interval,
        rx,
    )
    .await;

    assert_eq!(completed, 3);
    assert_eq!(sink.seen.len(), 3);
    assert_eq!(cycle.series().len(), 3);
}

#[tokio::test]
async fn already_shut_down_runs_nothing() {
    let config = test_config(5);
    let mut cycle = MonitoringCycle::new(&config, Utc::now()).unwrap();
    let (tx, rx) = watch::channel(true);
    let mut sink = StoppingSink {
        seen: Vec::new(),
        stop_after: 1,
        shutdown: tx,
    };

    let completed = runner::run(&mut cycle, &mut SteadySource, &mut sink, config.cycle_interval, rx).await;

    assert_eq!(completed, 0);
    assert!(sink.seen.is_empty());
}

// ---------------------------------------------------------------------------
// Test: console frames
// ---------------------------------------------------------------------------

#[test]
fn console_renders_current_page_and_brightness() {
    let config = test_config(5);
    let mut cycle = MonitoringCycle::new(&config, Utc::now()).unwrap();
    let output = cycle.step(&mut SteadySource, &mut None::<ConsoleDisplay>, Utc::now());

    let mut console = ConsoleDisplay::new(DisplayPage::Channel(Channel::Temperature));
    let night = console.render(&output, NaiveTime::from_hms_opt(23, 15, 0).unwrap());
    assert_eq!(night.text, "214c");
    assert_eq!(night.brightness, Brightness::Dim);
    assert_eq!(night.pages.len(), DisplayPage::ALL.len());

    console.button().press();
    console.present(&output);
    assert_eq!(console.page(), DisplayPage::Channel(Channel::Pressure));
    let day = console.render(&output, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    assert_eq!(day.text, "1013");
    assert_eq!(day.brightness, Brightness::Full);
}

// ---------------------------------------------------------------------------
// Test: station configuration
// ---------------------------------------------------------------------------

fn station(pairs: &[(&str, &str)]) -> Result<StationConfig, envmon_core::error::CoreError> {
    let map: HashMap<&str, &str> = pairs.iter().copied().collect();
    StationConfig::from_vars(|k| map.get(k).map(|v| v.to_string()))
}

#[test]
fn station_defaults_without_broker() {
    let config = station(&[("MQTT_ENABLED", "false")]).unwrap();

    assert!(config.mqtt.is_none());
    assert_eq!(config.monitor.cycle_interval, Duration::from_secs(1));
    assert_eq!(config.display_page, DisplayPage::Channel(Channel::Temperature));
    assert!(config.smoke_path.is_none());
}

#[test]
fn station_reads_display_page_and_broker() {
    let config = station(&[
        ("MQTT_HOST", "broker.local"),
        ("DISPLAY_PAGE", "airq"),
        ("SMOKE_SENSOR_PATH", "/run/pms5003/count"),
    ])
    .unwrap();

    assert_eq!(config.mqtt.unwrap().client_id, "envmon-station");
    assert_eq!(config.display_page, DisplayPage::Channel(Channel::AirQuality));
    assert!(config.smoke_path.is_some());
}

#[test]
fn station_rejects_unknown_display_page() {
    assert!(station(&[("MQTT_ENABLED", "false"), ("DISPLAY_PAGE", "WIND")]).is_err());
}
