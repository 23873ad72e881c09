use std::path::PathBuf;
use std::time::Duration;

use envmon_core::config::MonitorConfig;
use envmon_core::display::DisplayPage;
use envmon_core::error::CoreError;
use envmon_core::mqtt::MqttSettings;

/// Default seconds between sensor polls.
const DEFAULT_INTERVAL_SECS: u64 = 1;

/// Sysfs directory of the first IIO device, where the kernel's bme680
/// driver usually lands.
const DEFAULT_IIO_DIR: &str = "/sys/bus/iio/devices/iio:device0";

const DEFAULT_CLIENT_ID: &str = "envmon-station";

/// Station configuration loaded from environment variables.
///
/// Monitoring and broker settings are documented on
/// [`MonitorConfig`] and [`MqttSettings`]. Station-specific ones:
///
/// | Env Var             | Default                              |
/// |---------------------|--------------------------------------|
/// | `BME680_IIO_DIR`    | `/sys/bus/iio/devices/iio:device0`   |
/// | `SMOKE_SENSOR_PATH` | unset (particle count reported as 0) |
/// | `DISPLAY_PAGE`      | `TEMP`                               |
#[derive(Debug, Clone)]
pub struct StationConfig {
    pub monitor: MonitorConfig,
    /// `None` when publishing is switched off.
    pub mqtt: Option<MqttSettings>,
    pub iio_dir: PathBuf,
    pub smoke_path: Option<PathBuf>,
    pub display_page: DisplayPage,
}

impl StationConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(get: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let monitor =
            MonitorConfig::from_vars(&get, Duration::from_secs(DEFAULT_INTERVAL_SECS))?;
        let mqtt = MqttSettings::from_vars(&get, DEFAULT_CLIENT_ID)?;

        let iio_dir = get("BME680_IIO_DIR")
            .unwrap_or_else(|| DEFAULT_IIO_DIR.to_string())
            .into();
        let smoke_path = get("SMOKE_SENSOR_PATH").map(PathBuf::from);
        let display_page = match get("DISPLAY_PAGE") {
            Some(raw) => raw.parse()?,
            None => DisplayPage::Channel(envmon_core::channel::Channel::Temperature),
        };

        Ok(Self {
            monitor,
            mqtt,
            iio_dir,
            smoke_path,
            display_page,
        })
    }
}
