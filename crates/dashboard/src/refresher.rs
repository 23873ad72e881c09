//! The dashboard's single writer.
//!
//! [`Refresher`] owns the [`MonitoringCycle`]. On every tick it drains the
//! inbound queue fed by the MQTT subscriber, runs one cycle, publishes the
//! output on a `watch` channel for the HTTP handlers and pushes it to
//! WebSocket clients.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use envmon_core::config::MonitorConfig;
use envmon_core::cycle::{CycleOutput, DisplaySink, MonitoringCycle, SensorSource};
use envmon_core::error::{CoreError, SensorError};
use envmon_core::reading::SensorSample;

use crate::ws::{cycle_message, WsManager};

/// Samples decoded from the broker, newest wins.
///
/// When nothing new arrived since the last cycle the previous sample is
/// reused; before the first message ever arrives reads fail, which the
/// cycle turns into a zero reading.
pub struct InboundSource {
    rx: mpsc::Receiver<SensorSample>,
    last: Option<SensorSample>,
}

impl InboundSource {
    pub fn new(rx: mpsc::Receiver<SensorSample>) -> Self {
        Self { rx, last: None }
    }
}

impl SensorSource for InboundSource {
    fn read(&mut self) -> Result<SensorSample, SensorError> {
        let mut drained = 0usize;
        while let Ok(sample) = self.rx.try_recv() {
            self.last = Some(sample);
            drained += 1;
        }
        if drained > 1 {
            tracing::debug!(skipped = drained - 1, "Coalesced queued readings");
        }
        self.last
            .ok_or_else(|| SensorError::Unavailable("no reading received from broker yet".into()))
    }
}

/// Publishes each output to the handlers' `watch` channel.
struct WatchSink {
    tx: watch::Sender<Option<Arc<CycleOutput>>>,
}

impl DisplaySink for WatchSink {
    fn present(&mut self, output: &CycleOutput) {
        self.tx.send_replace(Some(Arc::new(output.clone())));
    }
}

pub struct Refresher {
    cycle: MonitoringCycle,
    source: InboundSource,
    sink: WatchSink,
    ws_manager: Arc<WsManager>,
}

impl Refresher {
    pub fn new(
        config: &MonitorConfig,
        inbound: mpsc::Receiver<SensorSample>,
        latest: watch::Sender<Option<Arc<CycleOutput>>>,
        ws_manager: Arc<WsManager>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            cycle: MonitoringCycle::new(config, Utc::now())?,
            source: InboundSource::new(inbound),
            sink: WatchSink { tx: latest },
            ws_manager,
        })
    }

    /// Run one cycle and fan the result out.
    pub async fn refresh(&mut self) -> Arc<CycleOutput> {
        let output = Arc::new(self.cycle.step(&mut self.source, &mut self.sink, Utc::now()));
        self.ws_manager.broadcast(cycle_message(&output)).await;
        output
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycle.cycles_completed()
    }

    /// Refresh every `interval` until `shutdown` becomes `true` or its
    /// sender is dropped.
    pub async fn run(mut self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::info!(cycles = self.cycles_completed(), "Refresher stopped");
    }
}
