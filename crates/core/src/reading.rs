//! Raw sensor samples and scored readings.

use serde::{Deserialize, Serialize};

use crate::air_quality;
use crate::channel::Channel;

/// Highest humidity the station reports; the BME68x can read 100 % but the
/// display only has room for `99.9`.
pub const MAX_HUMIDITY: f64 = 99.9;

/// One poll of the sensor source, before the air-quality score is derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub temperature: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub gas_resistance: u32,
    pub smoke: u32,
}

impl SensorSample {
    /// Build a sample from raw floating-point values.
    ///
    /// Non-finite inputs become zero, humidity is clamped to
    /// `[0, MAX_HUMIDITY]`, and the integer channels are rounded and
    /// clamped at zero.
    pub fn new(temperature: f64, pressure: f64, humidity: f64, gas: f64, smoke: f64) -> Self {
        Self {
            temperature: finite_or_zero(temperature),
            pressure: finite_or_zero(pressure),
            humidity: finite_or_zero(humidity).clamp(0.0, MAX_HUMIDITY),
            gas_resistance: to_count(gas),
            smoke: to_count(smoke),
        }
    }

    /// Placeholder used while a sensor is unavailable.
    pub fn zero() -> Self {
        Self {
            temperature: 0.0,
            pressure: 0.0,
            humidity: 0.0,
            gas_resistance: 0,
            smoke: 0,
        }
    }
}

/// A sample plus its derived air-quality score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub temperature: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub gas_resistance: u32,
    pub smoke: u32,
    pub air_quality: f64,
}

impl Reading {
    /// Score a sample.
    pub fn from_sample(sample: SensorSample) -> Self {
        let air_quality = air_quality::score(sample.humidity, f64::from(sample.gas_resistance));
        Self {
            temperature: sample.temperature,
            pressure: sample.pressure,
            humidity: sample.humidity,
            gas_resistance: sample.gas_resistance,
            smoke: sample.smoke,
            air_quality,
        }
    }

    /// All-zero reading used to seed the series buffer.
    pub fn zero() -> Self {
        Self {
            temperature: 0.0,
            pressure: 0.0,
            humidity: 0.0,
            gas_resistance: 0,
            smoke: 0,
            air_quality: 0.0,
        }
    }

    /// Value of a single channel as `f64`.
    pub fn value(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Temperature => self.temperature,
            Channel::Pressure => self.pressure,
            Channel::Humidity => self.humidity,
            Channel::Gas => f64::from(self.gas_resistance),
            Channel::Smoke => f64::from(self.smoke),
            Channel::AirQuality => self.air_quality,
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Round to a non-negative integer count; `as` saturates above `u32::MAX`.
fn to_count(value: f64) -> u32 {
    finite_or_zero(value).round().max(0.0) as u32
}
