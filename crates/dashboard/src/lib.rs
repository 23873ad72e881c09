//! Environment dashboard server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! MQTT intake, refresher, WebSocket infrastructure) so integration tests
//! and the binary entrypoint can both access them.

pub mod config;
pub mod error;
pub mod refresher;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod subscriber;
pub mod ws;
