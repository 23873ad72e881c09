//! MQTT intake: decode station messages and queue them for the refresher.
//!
//! Only the newest sample matters, so a full queue drops the incoming
//! message rather than blocking the event loop.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, Packet, QoS};
use tokio::sync::{mpsc, watch};

use envmon_core::error::CoreError;
use envmon_core::mqtt::MqttSettings;
use envmon_core::reading::SensorSample;
use envmon_core::wire;

/// Depth of the queue between the subscriber and the refresher.
pub const INBOUND_CAPACITY: usize = 32;

const REQUEST_CAPACITY: usize = 16;

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Decode one payload and queue its sample.
///
/// Returns `false` when the payload was rejected or could not be queued;
/// the refresher then keeps using the previous sample.
pub fn forward(payload: &[u8], tx: &mpsc::Sender<SensorSample>) -> bool {
    let message = match wire::decode(payload) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(error = %e, bytes = payload.len(), "Rejected malformed reading");
            return false;
        }
    };

    match tx.try_send(message.sample()) {
        Ok(()) => {
            tracing::trace!(time_stamp = %message.time_stamp, "Reading queued");
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "Inbound queue unavailable, reading dropped");
            false
        }
    }
}

/// Create the client. Fails only on unreadable TLS material; the broker
/// itself is not contacted until [`run`] polls.
pub fn connect(settings: &MqttSettings) -> Result<(AsyncClient, EventLoop), CoreError> {
    let (client, event_loop) = AsyncClient::new(settings.options()?, REQUEST_CAPACITY);
    tracing::info!(
        host = %settings.host,
        port = settings.port,
        client_id = %settings.client_id,
        topic = %settings.topic,
        tls = settings.tls.is_some(),
        "MQTT subscriber configured",
    );
    Ok((client, event_loop))
}

/// Subscribe to `topic` and forward readings until `shutdown` becomes
/// `true`. Connection errors are retried after a fixed delay.
pub async fn run(
    client: AsyncClient,
    mut event_loop: EventLoop,
    topic: String,
    tx: mpsc::Sender<SensorSample>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            event = event_loop.poll() => match event {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    forward(&publish.payload, &tx);
                }
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    // Subscriptions do not survive a clean session, so
                    // (re)subscribe on every connect.
                    tracing::info!(code = ?ack.code, "Connected to MQTT broker");
                    if let Err(e) = client.try_subscribe(topic.as_str(), QoS::AtLeastOnce) {
                        tracing::error!(error = %e, topic = %topic, "Subscribe failed");
                    }
                }
                Ok(Event::Incoming(Packet::SubAck(ack))) => {
                    tracing::info!(pkid = ack.pkid, topic = %topic, "Subscribed");
                }
                Ok(event) => {
                    tracing::trace!(?event, "MQTT event");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "MQTT connection error");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            },
        }
    }

    if let Err(e) = client.try_disconnect() {
        tracing::debug!(error = %e, "MQTT disconnect request failed");
    }
    tracing::info!("MQTT subscriber stopped");
}
