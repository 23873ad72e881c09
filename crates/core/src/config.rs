//! Settings shared by every host of the monitoring cycle.
//!
//! Hosts read their environment and hand a lookup function to
//! [`MonitorConfig::from_vars`], which keeps this crate free of process
//! state and lets tests feed a plain map.
//!
//! | Variable              | Default          |
//! |-----------------------|------------------|
//! | `SERIES_CAPACITY`     | `100` (max `100000`) |
//! | `SERIES_SEED`         | `true`           |
//! | `CYCLE_INTERVAL_SECS` | host-specific    |
//! | `BAND_TEMPERATURE`    | `5,25`           |
//! | `BAND_PRESSURE`       | `980,1300`       |
//! | `BAND_HUMIDITY`       | `30,50`          |
//! | `BAND_GAS`            | `30000,1000000`  |
//! | `BAND_SMOKE`          | `80,100`         |
//! | `BAND_AIR_QUALITY`    | `50,10000`       |

use std::time::Duration;

use crate::channel::Channel;
use crate::error::CoreError;
use crate::series::{DEFAULT_CAPACITY, MAX_CAPACITY};
use crate::thresholds::{ThresholdBand, ThresholdBands};

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Points kept in the rolling series.
    pub series_capacity: usize,
    /// Pre-fill the series with zeros so charts start full width.
    pub seed_series: bool,
    /// Time between monitoring cycles.
    pub cycle_interval: Duration,
    pub bands: ThresholdBands,
}

impl MonitorConfig {
    /// Defaults with the given cycle interval.
    pub fn with_interval(cycle_interval: Duration) -> Self {
        Self {
            series_capacity: DEFAULT_CAPACITY,
            seed_series: true,
            cycle_interval,
            bands: ThresholdBands::default(),
        }
    }

    /// Build from `KEY -> value` lookups, falling back to defaults for
    /// absent keys. Present but unparsable values are errors.
    pub fn from_vars<F>(get: F, default_interval: Duration) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::with_interval(default_interval);

        if let Some(raw) = get("SERIES_CAPACITY") {
            config.series_capacity = raw.trim().parse().map_err(|_| {
                CoreError::Validation(format!("SERIES_CAPACITY must be a positive integer, got '{raw}'"))
            })?;
        }
        if let Some(raw) = get("SERIES_SEED") {
            config.seed_series = parse_bool(&raw).ok_or_else(|| {
                CoreError::Validation(format!("SERIES_SEED must be true or false, got '{raw}'"))
            })?;
        }
        if let Some(raw) = get("CYCLE_INTERVAL_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                CoreError::Validation(format!("CYCLE_INTERVAL_SECS must be an integer, got '{raw}'"))
            })?;
            config.cycle_interval = Duration::from_secs(secs);
        }
        for channel in Channel::ALL {
            let key = band_var(channel);
            if let Some(raw) = get(&key) {
                *config.bands.get_mut(channel) = parse_band(&raw)
                    .map_err(|e| CoreError::Validation(format!("{key}: {e}")))?;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.series_capacity == 0 || self.series_capacity > MAX_CAPACITY {
            return Err(CoreError::Validation(format!(
                "SERIES_CAPACITY must be between 1 and {MAX_CAPACITY}, got {}",
                self.series_capacity
            )));
        }
        if self.cycle_interval.is_zero() {
            return Err(CoreError::Validation(
                "CYCLE_INTERVAL_SECS must be at least 1".to_string(),
            ));
        }
        self.bands.validate()
    }
}

/// Environment variable holding the band for `channel`, e.g. `BAND_AIR_QUALITY`.
pub fn band_var(channel: Channel) -> String {
    format!("BAND_{}", channel.name().to_ascii_uppercase())
}

/// Parse `"low,high"`.
pub fn parse_band(raw: &str) -> Result<ThresholdBand, CoreError> {
    let (low, high) = raw
        .split_once(',')
        .ok_or_else(|| CoreError::Validation(format!("expected 'low,high', got '{raw}'")))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|_| CoreError::Validation(format!("'{}' is not a number", s.trim())))
    };
    ThresholdBand::new(parse(low)?, parse(high)?)
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(pairs: &[(&str, &str)]) -> Result<MonitorConfig, CoreError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        MonitorConfig::from_vars(|k| map.get(k).cloned(), Duration::from_secs(2))
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = from_map(&[]).unwrap();
        assert_eq!(config, MonitorConfig::with_interval(Duration::from_secs(2)));
        assert_eq!(config.series_capacity, 100);
        assert!(config.seed_series);
    }

    #[test]
    fn overrides_are_applied() {
        let config = from_map(&[
            ("SERIES_CAPACITY", "5"),
            ("SERIES_SEED", "no"),
            ("CYCLE_INTERVAL_SECS", "10"),
            ("BAND_AIR_QUALITY", " 60 , 99.9 "),
        ])
        .unwrap();
        assert_eq!(config.series_capacity, 5);
        assert!(!config.seed_series);
        assert_eq!(config.cycle_interval, Duration::from_secs(10));
        assert_eq!(config.bands.air_quality, ThresholdBand { low: 60.0, high: 99.9 });
    }

    #[test]
    fn rejects_bad_values() {
        assert!(from_map(&[("SERIES_CAPACITY", "0")]).is_err());
        assert!(from_map(&[("SERIES_CAPACITY", "-1")]).is_err());
        assert!(from_map(&[("SERIES_CAPACITY", "100001")]).is_err());
        assert!(from_map(&[("SERIES_CAPACITY", "18446744073709551615")]).is_err());
        assert!(from_map(&[("CYCLE_INTERVAL_SECS", "0")]).is_err());
        assert!(from_map(&[("BAND_GAS", "50000")]).is_err());
        assert!(from_map(&[("BAND_HUMIDITY", "60,30")]).is_err());
        assert!(from_map(&[("SERIES_SEED", "maybe")]).is_err());
    }

    #[test]
    fn band_var_names() {
        assert_eq!(band_var(Channel::AirQuality), "BAND_AIR_QUALITY");
        assert_eq!(band_var(Channel::Temperature), "BAND_TEMPERATURE");
    }
}
