//! The station's timer loop.
//!
//! One [`MonitoringCycle::step`] per tick until shutdown is signalled.
//! The first cycle runs immediately; ticks missed while a step was slow
//! are skipped rather than bunched up.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use envmon_core::cycle::{DisplaySink, MonitoringCycle, SensorSource};

/// Run cycles every `interval` until `shutdown` becomes `true` (or its
/// sender is dropped). Returns the number of cycles completed.
pub async fn run<S, D>(
    cycle: &mut MonitoringCycle,
    source: &mut S,
    sink: &mut D,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> u64
where
    S: SensorSource + ?Sized,
    D: DisplaySink + ?Sized,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let started = cycle.cycles_completed();

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {
                cycle.step(source, sink, Utc::now());
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    let completed = cycle.cycles_completed() - started;
    tracing::info!(cycles = completed, "Monitoring loop stopped");
    completed
}
