//! MQTT publishing of each cycle's reading.
//!
//! [`MqttPublisher`] is a [`DisplaySink`]: it enqueues the wire message
//! without blocking the cycle. The `rumqttc` event loop that actually
//! talks to the broker runs in its own task ([`drive_event_loop`]) and
//! reconnects on its own after a short back-off.

use std::time::Duration;

use chrono::Local;
use rumqttc::{AsyncClient, Event, EventLoop, Packet, QoS};
use tokio::sync::watch;

use envmon_core::cycle::{CycleOutput, DisplaySink};
use envmon_core::error::CoreError;
use envmon_core::mqtt::MqttSettings;
use envmon_core::wire;

/// Outgoing request queue depth inside `rumqttc`.
pub const REQUEST_CAPACITY: usize = 16;

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

pub struct MqttPublisher {
    client: AsyncClient,
    topic: String,
    published: u64,
    dropped: u64,
}

impl MqttPublisher {
    /// Create the client; the returned event loop must be handed to
    /// [`drive_event_loop`] before anything reaches the broker.
    pub fn connect(settings: &MqttSettings) -> Result<(Self, EventLoop), CoreError> {
        let (client, event_loop) = AsyncClient::new(settings.options()?, REQUEST_CAPACITY);
        tracing::info!(
            host = %settings.host,
            port = settings.port,
            client_id = %settings.client_id,
            topic = %settings.topic,
            tls = settings.tls.is_some(),
            "MQTT publisher configured",
        );
        Ok((
            Self {
                client,
                topic: settings.topic.clone(),
                published: 0,
                dropped: 0,
            },
            event_loop,
        ))
    }

    pub fn published(&self) -> u64 {
        self.published
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub async fn disconnect(&self) {
        if let Err(e) = self.client.disconnect().await {
            tracing::debug!(error = %e, "MQTT disconnect request failed");
        }
    }
}

impl DisplaySink for MqttPublisher {
    fn present(&mut self, output: &CycleOutput) {
        let payload = wire::encode(&output.reading, Local::now().time());
        match self
            .client
            .try_publish(self.topic.as_str(), QoS::AtLeastOnce, false, payload)
        {
            Ok(()) => self.published += 1,
            Err(e) => {
                // Queue full while the broker is unreachable; the next
                // cycle carries a fresher reading anyway.
                self.dropped += 1;
                tracing::warn!(error = %e, dropped = self.dropped, "Reading not published");
            }
        }
    }
}

/// Poll the connection until `shutdown` flips to `true`.
pub async fn drive_event_loop(mut event_loop: EventLoop, mut shutdown: watch::Receiver<bool>) {
    let mut connected = false;

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            event = event_loop.poll() => match event {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    connected = true;
                    tracing::info!(code = ?ack.code, "Connected to MQTT broker");
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    connected = false;
                    tracing::warn!("Broker closed the MQTT session");
                }
                Ok(event) => {
                    tracing::trace!(?event, "MQTT event");
                }
                Err(e) => {
                    if connected {
                        tracing::warn!(error = %e, "MQTT connection lost");
                    } else {
                        tracing::debug!(error = %e, "MQTT connect attempt failed");
                    }
                    connected = false;
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            },
        }
    }

    tracing::info!("MQTT event loop stopped");
}
