//! The monitoring cycle: read, score, evaluate, buffer, hand off.
//!
//! [`MonitoringCycle`] exclusively owns the rolling series, the indicator
//! phase and the threshold bands. Each [`MonitoringCycle::step`] runs to
//! completion synchronously; the host decides when to trigger it (a timer
//! on the station, a refresh tick on the dashboard). Collaborators only
//! ever see copies of the state through [`CycleOutput`].

use serde::Serialize;

use crate::air_quality::AirQualityBand;
use crate::config::MonitorConfig;
use crate::error::{CoreError, SensorError};
use crate::indicator::{Indicator, IndicatorState};
use crate::reading::{Reading, SensorSample};
use crate::series::{SeriesBuffer, SeriesPoint};
use crate::thresholds::{ThresholdBands, WarningState};
use crate::types::Timestamp;

/// Supplies raw samples (sensor registers, sysfs, an inbound MQTT queue...).
pub trait SensorSource {
    fn read(&mut self) -> Result<SensorSample, SensorError>;
}

/// Consumes the result of each cycle (display, indicator LED, publisher...).
pub trait DisplaySink {
    fn present(&mut self, output: &CycleOutput);
}

impl<T: SensorSource + ?Sized> SensorSource for Box<T> {
    fn read(&mut self) -> Result<SensorSample, SensorError> {
        (**self).read()
    }
}

impl<T: DisplaySink + ?Sized> DisplaySink for Box<T> {
    fn present(&mut self, output: &CycleOutput) {
        (**self).present(output);
    }
}

/// A disabled sink is skipped.
impl<T: DisplaySink> DisplaySink for Option<T> {
    fn present(&mut self, output: &CycleOutput) {
        if let Some(sink) = self {
            sink.present(output);
        }
    }
}

/// Fan out to two sinks, left first.
impl<A: DisplaySink, B: DisplaySink> DisplaySink for (A, B) {
    fn present(&mut self, output: &CycleOutput) {
        self.0.present(output);
        self.1.present(output);
    }
}

/// Everything a sink needs from one cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleOutput {
    pub timestamp: Timestamp,
    pub reading: Reading,
    /// `false` when the source failed and a zero sample was substituted.
    pub sensor_ok: bool,
    pub warnings: WarningState,
    pub indicator: IndicatorState,
    /// Chronological copy of the rolling window, this cycle included.
    pub series: Vec<SeriesPoint>,
}

impl CycleOutput {
    pub fn air_quality_band(&self) -> AirQualityBand {
        AirQualityBand::from_score(self.reading.air_quality)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePhase {
    /// Waiting for the next trigger.
    Idle,
    /// Scoring, evaluating and buffering a sample.
    Processing,
}

#[derive(Debug)]
pub struct MonitoringCycle {
    bands: ThresholdBands,
    series: SeriesBuffer,
    indicator: Indicator,
    phase: CyclePhase,
    cycles_completed: u64,
}

impl MonitoringCycle {
    /// Build the cycle state; the series is seeded at `now` unless the
    /// config turns seeding off.
    pub fn new(config: &MonitorConfig, now: Timestamp) -> Result<Self, CoreError> {
        config.validate()?;
        let series = if config.seed_series {
            SeriesBuffer::seeded(config.series_capacity, now)?
        } else {
            SeriesBuffer::new(config.series_capacity)?
        };
        Ok(Self {
            bands: config.bands.clone(),
            series,
            indicator: Indicator::new(),
            phase: CyclePhase::Idle,
            cycles_completed: 0,
        })
    }

    /// Run one cycle. Never fails: a source error becomes a zero sample.
    pub fn step<S, D>(&mut self, source: &mut S, sink: &mut D, now: Timestamp) -> CycleOutput
    where
        S: SensorSource + ?Sized,
        D: DisplaySink + ?Sized,
    {
        self.phase = CyclePhase::Processing;

        let (sample, sensor_ok) = match source.read() {
            Ok(sample) => (sample, true),
            Err(e) => {
                tracing::warn!(error = %e, "Sensor read failed -- substituting zero reading");
                (SensorSample::zero(), false)
            }
        };

        let reading = Reading::from_sample(sample);

        let warnings = WarningState::evaluate(&reading, &self.bands);
        if let Some(trigger) = &warnings.trigger {
            tracing::warn!(
                channel = %trigger.channel,
                value = trigger.value,
                low = trigger.band.low,
                high = trigger.band.high,
                "Reading outside warning band",
            );
        }
        let indicator = self.indicator.advance(warnings.any());

        self.series.append(now, reading);

        let output = CycleOutput {
            timestamp: now,
            reading,
            sensor_ok,
            warnings,
            indicator,
            series: self.series.snapshot(),
        };

        sink.present(&output);

        self.cycles_completed += 1;
        self.phase = CyclePhase::Idle;

        tracing::debug!(
            cycle = self.cycles_completed,
            air_quality = reading.air_quality,
            sensor_ok,
            warning = indicator.warning_active,
            "Monitoring cycle complete",
        );

        output
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    pub fn bands(&self) -> &ThresholdBands {
        &self.bands
    }

    pub fn series(&self) -> &SeriesBuffer {
        &self.series
    }
}
