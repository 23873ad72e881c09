//! Warning-band evaluation for readings.
//!
//! Pure logic. A value is in warning when it lies strictly outside its
//! channel's `[low, high]` band; values on a boundary pass.
//!
//! [`WarningState`] carries a flag for every channel, but the trigger it
//! reports (and the one that drives the indicator and the warning log) is
//! only the *first* channel in [`Channel::ALL`] order that is out of band.
//! Further violations are not accumulated into the trigger.

use serde::{Deserialize, Serialize};

use crate::channel::{Channel, CHANNEL_COUNT};
use crate::error::CoreError;
use crate::reading::Reading;

/// Inclusive acceptable range for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBand {
    pub low: f64,
    pub high: f64,
}

impl ThresholdBand {
    /// Build a band, rejecting `low > high` and non-finite bounds.
    pub fn new(low: f64, high: f64) -> Result<Self, CoreError> {
        if !low.is_finite() || !high.is_finite() {
            return Err(CoreError::Validation(format!(
                "band bounds must be finite, got [{low}, {high}]"
            )));
        }
        if low > high {
            return Err(CoreError::Validation(format!(
                "band low must not exceed high, got [{low}, {high}]"
            )));
        }
        Ok(Self { low, high })
    }

    /// Whether `value` lies strictly outside the band.
    pub fn is_violated_by(&self, value: f64) -> bool {
        value < self.low || value > self.high
    }
}

/// `true` when `value` is outside `band` for `channel`.
pub fn evaluate(channel: Channel, value: f64, band: &ThresholdBand) -> bool {
    let warning = band.is_violated_by(value);
    if warning {
        tracing::trace!(%channel, value, low = band.low, high = band.high, "Value out of band");
    }
    warning
}

/// One band per channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBands {
    pub temperature: ThresholdBand,
    pub pressure: ThresholdBand,
    pub humidity: ThresholdBand,
    pub gas: ThresholdBand,
    pub smoke: ThresholdBand,
    pub air_quality: ThresholdBand,
}

impl Default for ThresholdBands {
    /// The station's stock warning table.
    fn default() -> Self {
        Self {
            temperature: ThresholdBand { low: 5.0, high: 25.0 },
            pressure: ThresholdBand { low: 980.0, high: 1300.0 },
            humidity: ThresholdBand { low: 30.0, high: 50.0 },
            gas: ThresholdBand { low: 30_000.0, high: 1_000_000.0 },
            smoke: ThresholdBand { low: 80.0, high: 100.0 },
            air_quality: ThresholdBand { low: 50.0, high: 10_000.0 },
        }
    }
}

impl ThresholdBands {
    pub fn get(&self, channel: Channel) -> &ThresholdBand {
        match channel {
            Channel::Temperature => &self.temperature,
            Channel::Pressure => &self.pressure,
            Channel::Humidity => &self.humidity,
            Channel::Gas => &self.gas,
            Channel::Smoke => &self.smoke,
            Channel::AirQuality => &self.air_quality,
        }
    }

    pub fn get_mut(&mut self, channel: Channel) -> &mut ThresholdBand {
        match channel {
            Channel::Temperature => &mut self.temperature,
            Channel::Pressure => &mut self.pressure,
            Channel::Humidity => &mut self.humidity,
            Channel::Gas => &mut self.gas,
            Channel::Smoke => &mut self.smoke,
            Channel::AirQuality => &mut self.air_quality,
        }
    }

    /// Re-check the `low <= high` invariant on every band.
    pub fn validate(&self) -> Result<(), CoreError> {
        for channel in Channel::ALL {
            let band = self.get(channel);
            ThresholdBand::new(band.low, band.high)
                .map_err(|e| CoreError::Validation(format!("{channel}: {e}")))?;
        }
        Ok(())
    }
}

/// The channel that tripped the warning scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelWarning {
    pub channel: Channel,
    pub value: f64,
    pub band: ThresholdBand,
}

/// Short-circuit scan: the first channel in declared order that is in warning.
pub fn first_warning(reading: &Reading, bands: &ThresholdBands) -> Option<ChannelWarning> {
    Channel::ALL.into_iter().find_map(|channel| {
        let value = reading.value(channel);
        let band = *bands.get(channel);
        evaluate(channel, value, &band).then_some(ChannelWarning {
            channel,
            value,
            band,
        })
    })
}

/// Per-channel warning flags for one reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarningState {
    /// Indexed by position in [`Channel::ALL`].
    flags: [bool; CHANNEL_COUNT],
    /// First channel found in warning, if any.
    pub trigger: Option<ChannelWarning>,
}

impl WarningState {
    /// Flag every channel and record the first-match trigger.
    pub fn evaluate(reading: &Reading, bands: &ThresholdBands) -> Self {
        let mut flags = [false; CHANNEL_COUNT];
        for (i, channel) in Channel::ALL.into_iter().enumerate() {
            flags[i] = bands.get(channel).is_violated_by(reading.value(channel));
        }
        Self {
            flags,
            trigger: first_warning(reading, bands),
        }
    }

    pub fn is_warning(&self, channel: Channel) -> bool {
        Channel::ALL
            .iter()
            .position(|c| *c == channel)
            .is_some_and(|i| self.flags[i])
    }

    /// Aggregate flag that drives the indicator.
    pub fn any(&self) -> bool {
        self.trigger.is_some()
    }

    /// Channels currently in warning, in declared order.
    pub fn channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .zip(self.flags)
            .filter_map(|(channel, flag)| flag.then_some(channel))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
