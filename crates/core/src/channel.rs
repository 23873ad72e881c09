//! Measurement channels and their canonical names.
//!
//! [`Channel::ALL`] is the declared evaluation order used by the threshold
//! scan. The MQTT payload uses a different, fixed array layout (see
//! [`Channel::wire_index`]) inherited from the station's publisher.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Number of channels in a reading (and elements in the wire array).
pub const CHANNEL_COUNT: usize = 6;

/// One measured or derived quantity of a [`Reading`](crate::reading::Reading).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Degrees Celsius.
    Temperature,
    /// Millibars.
    Pressure,
    /// Relative humidity percentage.
    Humidity,
    /// Gas resistance in ohms.
    Gas,
    /// Particle count from the optical sensor.
    Smoke,
    /// Derived score, see [`crate::air_quality`].
    AirQuality,
}

impl Channel {
    /// Declared evaluation order.
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::Temperature,
        Channel::Pressure,
        Channel::Humidity,
        Channel::Gas,
        Channel::Smoke,
        Channel::AirQuality,
    ];

    /// Machine name used in JSON, query strings and log fields.
    pub fn name(self) -> &'static str {
        match self {
            Channel::Temperature => "temperature",
            Channel::Pressure => "pressure",
            Channel::Humidity => "humidity",
            Channel::Gas => "gas",
            Channel::Smoke => "smoke",
            Channel::AirQuality => "air_quality",
        }
    }

    /// Four-character label shown on the LED display.
    pub fn label(self) -> &'static str {
        match self {
            Channel::Temperature => "TEMP",
            Channel::Pressure => "PRES",
            Channel::Humidity => "HUMI",
            Channel::Gas => "GAS ",
            Channel::Smoke => "SMOK",
            Channel::AirQuality => "AirQ",
        }
    }

    /// Position of this channel in the `readings` array of an MQTT message.
    ///
    /// ```text
    /// [0]=temperature [1]=pressure [2]=humidity [3]=gas [4]=air_quality [5]=smoke
    /// ```
    pub fn wire_index(self) -> usize {
        match self {
            Channel::Temperature => 0,
            Channel::Pressure => 1,
            Channel::Humidity => 2,
            Channel::Gas => 3,
            Channel::AirQuality => 4,
            Channel::Smoke => 5,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| CoreError::Validation(format!("unknown channel '{s}'")))
    }
}
