//! Broker settings shared by the station publisher and the dashboard
//! subscriber, and their translation into `rumqttc` options.
//!
//! | Variable         | Default            | Notes                                   |
//! |------------------|--------------------|-----------------------------------------|
//! | `MQTT_ENABLED`   | `true`             | station only; `false` skips publishing  |
//! | `MQTT_HOST`      | --                 | required when enabled                   |
//! | `MQTT_PORT`      | `8883`             |                                         |
//! | `MQTT_CLIENT_ID` | per binary         |                                         |
//! | `MQTT_TOPIC`     | `home/environment` |                                         |
//! | `MQTT_CA_PATH`   | --                 | TLS is used when all three paths are set|
//! | `MQTT_CERT_PATH` | --                 |                                         |
//! | `MQTT_KEY_PATH`  | --                 |                                         |

use std::path::PathBuf;
use std::time::Duration;

use rumqttc::{MqttOptions, TlsConfiguration, Transport};

use crate::config::parse_bool;
use crate::error::CoreError;

pub const DEFAULT_PORT: u16 = 8883;
pub const DEFAULT_TOPIC: &str = "home/environment";

const KEEP_ALIVE: Duration = Duration::from_secs(30);

/// Client certificate material for mutual TLS (AWS IoT style endpoints).
#[derive(Debug, Clone, PartialEq)]
pub struct TlsPaths {
    pub ca: PathBuf,
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub topic: String,
    pub tls: Option<TlsPaths>,
}

impl MqttSettings {
    /// Read broker settings; `Ok(None)` when `MQTT_ENABLED` is false.
    pub fn from_vars<F>(get: F, default_client_id: &str) -> Result<Option<Self>, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = get("MQTT_ENABLED") {
            let enabled = parse_bool(&raw).ok_or_else(|| {
                CoreError::Validation(format!("MQTT_ENABLED must be true or false, got '{raw}'"))
            })?;
            if !enabled {
                return Ok(None);
            }
        }

        let host = get("MQTT_HOST")
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| CoreError::Validation("MQTT_HOST is required".to_string()))?;

        let port = match get("MQTT_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                CoreError::Validation(format!("MQTT_PORT must be a valid u16, got '{raw}'"))
            })?,
            None => DEFAULT_PORT,
        };

        let client_id = get("MQTT_CLIENT_ID").unwrap_or_else(|| default_client_id.to_string());
        // rumqttc panics on an empty or space-prefixed client id.
        if client_id.is_empty() || client_id.starts_with(' ') {
            return Err(CoreError::Validation(format!(
                "MQTT_CLIENT_ID must be non-empty and not start with a space, got '{client_id}'"
            )));
        }
        let topic = get("MQTT_TOPIC").unwrap_or_else(|| DEFAULT_TOPIC.to_string());

        let tls = match (get("MQTT_CA_PATH"), get("MQTT_CERT_PATH"), get("MQTT_KEY_PATH")) {
            (Some(ca), Some(cert), Some(key)) => Some(TlsPaths {
                ca: ca.into(),
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None, None) => None,
            _ => {
                return Err(CoreError::Validation(
                    "MQTT_CA_PATH, MQTT_CERT_PATH and MQTT_KEY_PATH must be set together"
                        .to_string(),
                ))
            }
        };

        Ok(Some(Self {
            host,
            port,
            client_id,
            topic,
            tls,
        }))
    }

    /// Build client options, loading certificate files when TLS is configured.
    pub fn options(&self) -> Result<MqttOptions, CoreError> {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(KEEP_ALIVE);

        if let Some(tls) = &self.tls {
            let read = |path: &PathBuf| {
                std::fs::read(path).map_err(|e| {
                    CoreError::Validation(format!("cannot read {}: {e}", path.display()))
                })
            };
            options.set_transport(Transport::tls_with_config(TlsConfiguration::Simple {
                ca: read(&tls.ca)?,
                alpn: None,
                client_auth: Some((read(&tls.cert)?, read(&tls.key)?)),
            }));
        }

        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Option<MqttSettings>, CoreError> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        MqttSettings::from_vars(|k| map.get(k).map(|v| v.to_string()), "envmon-test")
    }

    #[test]
    fn disabled_needs_no_host() {
        assert_eq!(settings(&[("MQTT_ENABLED", "false")]).unwrap(), None);
    }

    #[test]
    fn host_is_required_when_enabled() {
        assert!(settings(&[]).is_err());
    }

    #[test]
    fn defaults_fill_in() {
        let s = settings(&[("MQTT_HOST", "broker.local")]).unwrap().unwrap();
        assert_eq!(s.port, DEFAULT_PORT);
        assert_eq!(s.client_id, "envmon-test");
        assert_eq!(s.topic, DEFAULT_TOPIC);
        assert!(s.tls.is_none());
        assert!(s.options().is_ok());
    }

    #[test]
    fn partial_tls_is_rejected() {
        assert!(settings(&[("MQTT_HOST", "h"), ("MQTT_CA_PATH", "/ca.crt")]).is_err());
    }

    #[test]
    fn missing_certificate_file_is_an_error() {
        let s = settings(&[
            ("MQTT_HOST", "h"),
            ("MQTT_CA_PATH", "/nonexistent/ca.crt"),
            ("MQTT_CERT_PATH", "/nonexistent/cert.pem"),
            ("MQTT_KEY_PATH", "/nonexistent/key.pem"),
        ])
        .unwrap()
        .unwrap();
        assert!(s.options().is_err());
    }
}
