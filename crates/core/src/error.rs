#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Failure reported by a [`SensorSource`](crate::cycle::SensorSource).
///
/// The monitoring cycle never propagates these; it substitutes a zero
/// sample and records `sensor_ok = false` in the cycle output.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("Sensor unavailable: {0}")]
    Unavailable(String),

    #[error("Sensor I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Sensor value at {path} is not a number: {raw:?}")]
    Parse { path: String, raw: String },
}
