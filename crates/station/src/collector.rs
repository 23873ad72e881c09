//! Sensor polling through the Linux IIO sysfs interface.
//!
//! [`IioSensorSource`] reads the processed `*_input` attributes that the
//! kernel's bme680 driver exposes, so no register-level I/O happens in
//! this process. The particle count comes from an optional file holding a
//! single integer (written by whatever drives the optical sensor).
//!
//! Units follow the IIO ABI and are converted to the station's units:
//!
//! | Attribute                     | IIO unit  | Station unit |
//! |-------------------------------|-----------|--------------|
//! | `in_temp_input`               | milli °C  | °C           |
//! | `in_pressure_input`           | kPa       | mb (hPa)     |
//! | `in_humidityrelative_input`   | milli %   | %            |
//! | `in_resistance_input`         | ohm       | ohm          |

use std::path::{Path, PathBuf};

use envmon_core::cycle::SensorSource;
use envmon_core::error::SensorError;
use envmon_core::reading::SensorSample;

const TEMPERATURE_FILE: &str = "in_temp_input";
const PRESSURE_FILE: &str = "in_pressure_input";
const HUMIDITY_FILE: &str = "in_humidityrelative_input";
const GAS_FILE: &str = "in_resistance_input";

const MILLI: f64 = 1000.0;
const MB_PER_KPA: f64 = 10.0;

pub struct IioSensorSource {
    dir: PathBuf,
    smoke_path: Option<PathBuf>,
}

impl IioSensorSource {
    pub fn new(dir: impl Into<PathBuf>, smoke_path: Option<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            smoke_path,
        }
    }

    /// Whether the device directory exists at all.
    pub fn is_present(&self) -> bool {
        self.dir.join(TEMPERATURE_FILE).exists()
    }

    fn attribute(&self, name: &str) -> Result<f64, SensorError> {
        read_number(&self.dir.join(name))
    }
}

impl SensorSource for IioSensorSource {
    fn read(&mut self) -> Result<SensorSample, SensorError> {
        let temperature = self.attribute(TEMPERATURE_FILE)? / MILLI;
        let pressure = self.attribute(PRESSURE_FILE)? * MB_PER_KPA;
        let humidity = self.attribute(HUMIDITY_FILE)? / MILLI;

        // The gas heater needs a few cycles to stabilise; until then the
        // driver refuses the read and the channel reports zero.
        let gas = match self.attribute(GAS_FILE) {
            Ok(ohms) => ohms,
            Err(e) => {
                tracing::debug!(error = %e, "Gas resistance not ready");
                0.0
            }
        };

        let smoke = match &self.smoke_path {
            Some(path) => match read_number(path) {
                Ok(count) => count,
                Err(e) => {
                    tracing::warn!(error = %e, "Particle sensor read failed");
                    0.0
                }
            },
            None => 0.0,
        };

        Ok(SensorSample::new(temperature, pressure, humidity, gas, smoke))
    }
}

/// Read a file containing one decimal number.
fn read_number(path: &Path) -> Result<f64, SensorError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SensorError::Io {
        path: path.display().to_string(),
        source,
    })?;
    raw.trim().parse().map_err(|_| SensorError::Parse {
        path: path.display().to_string(),
        raw: raw.trim().to_string(),
    })
}
