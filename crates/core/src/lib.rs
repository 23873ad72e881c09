//! `envmon-core` -- pure domain logic for the home environment station.
//!
//! Everything outside the optional `mqtt` module is free of I/O: the
//! station and dashboard binaries supply readings through
//! [`cycle::SensorSource`] and consume results through
//! [`cycle::DisplaySink`].

pub mod air_quality;
pub mod channel;
pub mod config;
pub mod cycle;
pub mod display;
pub mod error;
pub mod indicator;
#[cfg(feature = "mqtt")]
pub mod mqtt;
pub mod reading;
pub mod series;
pub mod thresholds;
pub mod types;
pub mod wire;
