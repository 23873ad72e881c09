//! JSON payload exchanged between the station and the dashboard over MQTT.
//!
//! ```json
//! { "time_stamp": "14:02:37", "readings": [21.4, 1013.2, 45.3, 23600, 58.2, 0] }
//! ```
//!
//! The array layout is fixed by [`Channel::wire_index`].

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::channel::{Channel, CHANNEL_COUNT};
use crate::reading::{Reading, SensorSample};

/// Format of the `time_stamp` field.
pub const TIME_STAMP_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Bad JSON, missing fields, or a `readings` array that is not six numbers.
    #[error("malformed readings message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A published reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingsMessage {
    /// Station wall-clock time of the poll. Consumers only need
    /// `readings`, so an absent stamp decodes as empty.
    #[serde(default)]
    pub time_stamp: String,
    /// Channel values in wire order.
    pub readings: [f64; CHANNEL_COUNT],
}

impl ReadingsMessage {
    pub fn from_reading(reading: &Reading, clock: NaiveTime) -> Self {
        let mut readings = [0.0; CHANNEL_COUNT];
        for channel in Channel::ALL {
            readings[channel.wire_index()] = reading.value(channel);
        }
        Self {
            time_stamp: clock.format(TIME_STAMP_FORMAT).to_string(),
            readings,
        }
    }

    /// The raw sample carried by the message.
    ///
    /// Index 4 (air quality) is ignored; consumers re-derive it from
    /// humidity and gas so a stale or hand-edited score cannot leak in.
    pub fn sample(&self) -> SensorSample {
        let at = |channel: Channel| self.readings[channel.wire_index()];
        SensorSample::new(
            at(Channel::Temperature),
            at(Channel::Pressure),
            at(Channel::Humidity),
            at(Channel::Gas),
            at(Channel::Smoke),
        )
    }
}

pub fn encode(reading: &Reading, clock: NaiveTime) -> Vec<u8> {
    let message = ReadingsMessage::from_reading(reading, clock);
    serde_json::to_vec(&message).expect("ReadingsMessage is always serialisable")
}

pub fn decode(payload: &[u8]) -> Result<ReadingsMessage, WireError> {
    Ok(serde_json::from_slice(payload)?)
}
