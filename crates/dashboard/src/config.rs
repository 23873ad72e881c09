use std::time::Duration;

use envmon_core::config::MonitorConfig;
use envmon_core::error::CoreError;
use envmon_core::mqtt::MqttSettings;

/// Seconds between refreshes of the displayed reading.
const DEFAULT_INTERVAL_SECS: u64 = 2;

const DEFAULT_CLIENT_ID: &str = "envmon-dashboard";

/// Server configuration loaded from environment variables.
///
/// Monitoring and broker settings are documented on [`MonitorConfig`] and
/// [`MqttSettings`]; the broker is mandatory here.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub monitor: MonitorConfig,
    pub mqtt: MqttSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8080`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `CYCLE_INTERVAL_SECS`  | `2`                        |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(get: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port: u16 = get("PORT")
            .unwrap_or_else(|| "8080".into())
            .parse()
            .map_err(|_| CoreError::Validation("PORT must be a valid u16".to_string()))?;

        let cors_origins: Vec<String> = get("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = get("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".into())
            .parse()
            .map_err(|_| {
                CoreError::Validation("REQUEST_TIMEOUT_SECS must be a valid u64".to_string())
            })?;

        let monitor = MonitorConfig::from_vars(&get, Duration::from_secs(DEFAULT_INTERVAL_SECS))?;

        let mqtt = MqttSettings::from_vars(&get, DEFAULT_CLIENT_ID)?.ok_or_else(|| {
            CoreError::Validation("the dashboard cannot run with MQTT_ENABLED=false".to_string())
        })?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            monitor,
            mqtt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, CoreError> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        ServerConfig::from_vars(|k| map.get(k).map(|v| v.to_string()))
    }

    #[test]
    fn defaults() {
        let config = load(&[("MQTT_HOST", "broker.local")]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.monitor.cycle_interval, Duration::from_secs(2));
        assert_eq!(config.mqtt.client_id, "envmon-dashboard");
    }

    #[test]
    fn broker_is_required() {
        assert!(load(&[]).is_err());
        assert!(load(&[("MQTT_HOST", "h"), ("MQTT_ENABLED", "false")]).is_err());
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let config = load(&[
            ("MQTT_HOST", "h"),
            ("CORS_ORIGINS", "http://a.local, http://b.local,"),
        ])
        .unwrap();
        assert_eq!(config.cors_origins, vec!["http://a.local", "http://b.local"]);
    }

    #[test]
    fn bad_port_is_rejected() {
        assert!(load(&[("MQTT_HOST", "h"), ("PORT", "http")]).is_err());
    }
}
