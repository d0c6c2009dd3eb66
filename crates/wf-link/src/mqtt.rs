//! MQTT transport
//!
//! The rumqttc event loop runs on a tokio task. Inbound notices cross to the
//! frame loop through an rtrb SPSC ring buffer; outbound commands go through
//! `try_publish`, which never blocks the caller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rtrb::{Consumer, Producer, RingBuffer};
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::backoff::Backoff;
use crate::error::LinkError;
use crate::link::{DeviceLink, LinkEvent};
use crate::protocol::{DeviceCommand, DeviceEvent, LinkConfig};

/// Outstanding requests buffered inside the rumqttc client
const CLIENT_CAPACITY: usize = 32;

/// MQTT-backed device link
pub struct MqttLink {
    config: LinkConfig,
    client: AsyncClient,
    connected: Arc<AtomicBool>,
    inbound: Consumer<LinkEvent>,
    task: JoinHandle<()>,
}

impl MqttLink {
    /// Start the connection task on `runtime`. Returns immediately; the
    /// session comes up in the background and reports `LinkEvent::Connected`.
    pub fn spawn(config: LinkConfig, runtime: &Handle) -> Result<Self, LinkError> {
        config.validate()?;

        let mut options = MqttOptions::new(config.client_id.clone(), config.host.clone(), config.port);
        options.set_keep_alive(config.keep_alive());

        let (client, eventloop) = AsyncClient::new(options, CLIENT_CAPACITY);
        let (producer, inbound) = RingBuffer::<LinkEvent>::new(config.inbound_capacity);
        let connected = Arc::new(AtomicBool::new(false));

        log::info!(
            "[Mqtt] Connecting to {}:{} as '{}'",
            config.host,
            config.port,
            config.client_id
        );

        let task = runtime.spawn(run_event_loop(
            eventloop,
            client.clone(),
            config.spin_topic.clone(),
            Backoff::from_millis(config.backoff_min_ms, config.backoff_max_ms),
            Arc::clone(&connected),
            producer,
        ));

        Ok(Self {
            config,
            client,
            connected,
            inbound,
            task,
        })
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }
}

impl DeviceLink for MqttLink {
    fn name(&self) -> &'static str {
        "mqtt"
    }

    fn publish(&mut self, command: &DeviceCommand) -> Result<(), LinkError> {
        if !self.is_connected() {
            return Err(LinkError::NotConnected);
        }
        self.client
            .try_publish(
                self.config.state_topic.clone(),
                QoS::AtMostOnce,
                false,
                command.to_payload(),
            )
            .map_err(|e| LinkError::PublishFailed(e.to_string()))
    }

    fn try_recv(&mut self) -> Option<LinkEvent> {
        self.inbound.pop().ok()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl Drop for MqttLink {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Lost connection notices are recovered by the synchronizer from `connected`
fn forward(tx: &mut Producer<LinkEvent>, event: LinkEvent) {
    if let Err(rtrb::PushError::Full(event)) = tx.push(event) {
        log::warn!("[Mqtt] Inbound queue full, dropping {:?}", event);
    }
}

async fn run_event_loop(
    mut eventloop: EventLoop,
    client: AsyncClient,
    spin_topic: String,
    mut backoff: Backoff,
    connected: Arc<AtomicBool>,
    mut tx: Producer<LinkEvent>,
) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                if ack.code != ConnectReturnCode::Success {
                    log::warn!("[Mqtt] Broker refused connection: {:?}", ack.code);
                    continue;
                }
                backoff.reset();
                // Clean session: subscriptions do not survive a reconnect
                if let Err(e) = client.try_subscribe(spin_topic.clone(), QoS::AtMostOnce) {
                    log::warn!("[Mqtt] Subscribe to '{}' failed: {}", spin_topic, e);
                }
                connected.store(true, Ordering::Release);
                log::info!("[Mqtt] Connected, listening on '{}'", spin_topic);
                forward(&mut tx, LinkEvent::Connected);
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let at = Instant::now();
                if publish.topic != spin_topic {
                    continue;
                }
                let payload = String::from_utf8_lossy(&publish.payload);
                match DeviceEvent::parse(&payload) {
                    Ok(DeviceEvent::ButtonPressed) => {
                        forward(&mut tx, LinkEvent::ButtonPressed { at });
                    }
                    Err(e) => log::warn!("[Mqtt] Ignoring message on '{}': {}", spin_topic, e),
                }
            }
            Ok(_) => {}
            Err(e) => {
                if connected.swap(false, Ordering::AcqRel) {
                    log::warn!("[Mqtt] Connection lost: {}", e);
                    forward(
                        &mut tx,
                        LinkEvent::Disconnected {
                            reason: e.to_string(),
                        },
                    );
                }
                let delay = backoff.next_delay();
                log::debug!(
                    "[Mqtt] Reconnect attempt {} in {}ms",
                    backoff.attempts(),
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_unreachable_broker_stays_disconnected() {
        let config = LinkConfig {
            backoff_min_ms: 10,
            backoff_max_ms: 20,
            ..LinkConfig::broker("127.0.0.1", 1)
        };
        let mut link = MqttLink::spawn(config, &Handle::current()).unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(!link.is_connected());
        assert!(matches!(link.publish(&DeviceCommand::Idle), Err(LinkError::NotConnected)));
        assert!(link.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_spawn_rejects_bad_config() {
        let config = LinkConfig {
            port: 0,
            ..LinkConfig::default()
        };
        assert!(matches!(
            MqttLink::spawn(config, &Handle::current()),
            Err(LinkError::InvalidConfig(_))
        ));
    }
}
