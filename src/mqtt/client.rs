use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{SendTimeoutError, Sender};
use log::{debug, error, info, warn};
use rumqttc::{Client, Connection, ConnectionError, Event, MqttOptions, Packet, QoS, Transport};

use crate::config::{MqttConfig, TransportKind};
use crate::types::BrokerEvent;
use super::control::{qos_from_level, BrokerControl, MqttError};

/// Requests queued inside the rumqttc client; `try_subscribe` fails once it is full
const CLIENT_REQUEST_CAPACITY: usize = 10;

const RECONNECT_POLL_INTERVAL: Duration = Duration::from_millis(50);

const FORWARD_TIMEOUT: Duration = Duration::from_millis(100);

/// Builds the rumqttc client/connection pair from configuration
pub fn connect(config: &MqttConfig) -> Result<(MqttControl, EventPump), MqttError> {
    let qos = qos_from_level(config.qos)?;

    let mut mqtt_options = MqttOptions::new(config.client_id.clone(), config.broker_address(), config.port);

    mqtt_options
        .set_keep_alive(Duration::from_secs(config.keep_alive as u64))
        .set_clean_session(true);

    if let Some(user) = &config.username {
        mqtt_options.set_credentials(user.clone(), config.password.clone().unwrap_or_default());
    }

    if config.transport == TransportKind::Websocket {
        mqtt_options.set_transport(Transport::Ws);
    }

    info!(
        "MQTT client {} -> {} (port {}, {:?})",
        config.client_id,
        config.broker_address(),
        config.port,
        config.transport
    );

    let (client, connection) = Client::new(mqtt_options, CLIENT_REQUEST_CAPACITY);
    let reconnect_requested = Arc::new(AtomicBool::new(false));

    let control = MqttControl {
        client,
        qos,
        reconnect_requested: Arc::clone(&reconnect_requested),
    };
    let pump = EventPump {
        connection,
        reconnect_requested,
        reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
    };

    Ok((control, pump))
}

/// Session-side handle on the broker connection
#[derive(Clone)]
pub struct MqttControl {
    client: Client,
    qos: QoS,
    reconnect_requested: Arc<AtomicBool>,
}

impl BrokerControl for MqttControl {
    fn subscribe(&self, topic: &str) -> Result<(), MqttError> {
        self.client.try_subscribe(topic, self.qos)?;
        Ok(())
    }

    fn request_reconnect(&self) -> Result<(), MqttError> {
        self.reconnect_requested.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn disconnect(&self) -> Result<(), MqttError> {
        self.client.try_disconnect()?;
        Ok(())
    }
}

/// Drives the rumqttc connection on its own thread and forwards lifecycle events
pub struct EventPump {
    connection: Connection,
    reconnect_requested: Arc<AtomicBool>,
    reconnect_delay: Duration,
}

/// What the pump does after forwarding the events of one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpAction {
    Continue,
    /// Connection dropped: hold off until the session asks for a reconnect
    AwaitReconnectRequest,
    /// Still offline: back off and let rumqttc try again
    RetryAfterDelay,
}

#[derive(Debug, PartialEq)]
pub struct PumpStep {
    pub events: Vec<BrokerEvent>,
    pub connected: bool,
    pub action: PumpAction,
}

/// Maps one poll result onto forwarded events, the new connection flag and the next action
pub fn translate(event: Result<Event, ConnectionError>, connected: bool) -> PumpStep {
    let step = |events, connected, action| PumpStep { events, connected, action };

    match event {
        Ok(Event::Incoming(Packet::ConnAck(ack))) => {
            debug!("ConnAck: {:?}", ack.code);
            step(vec![BrokerEvent::Connected], true, PumpAction::Continue)
        }
        Ok(Event::Incoming(Packet::Publish(publish))) => step(
            vec![BrokerEvent::message(publish.topic, publish.payload.to_vec())],
            connected,
            PumpAction::Continue,
        ),
        Ok(Event::Incoming(Packet::SubAck(ack))) => {
            debug!("SubAck pkid {}: {:?}", ack.pkid, ack.return_codes);
            step(Vec::new(), connected, PumpAction::Continue)
        }
        Ok(_) => step(Vec::new(), connected, PumpAction::Continue),
        Err(e) if connected => {
            error!("MQTT connection error: {}", e);
            step(
                vec![BrokerEvent::Error(e.to_string()), BrokerEvent::Closed],
                false,
                PumpAction::AwaitReconnectRequest,
            )
        }
        Err(e) => {
            warn!("MQTT connection attempt failed: {}", e);
            step(
                vec![BrokerEvent::Error(e.to_string()), BrokerEvent::Offline],
                false,
                PumpAction::RetryAfterDelay,
            )
        }
    }
}

impl EventPump {
    pub fn run(self, event_sender: Sender<BrokerEvent>, shutdown_signal: Arc<AtomicBool>) {
        let EventPump {
            mut connection,
            reconnect_requested,
            reconnect_delay,
        } = self;
        let mut connected = false;

        for event in connection.iter() {
            // 检查关闭信号
            if shutdown_signal.load(Ordering::Relaxed) {
                info!("MQTT thread received shutdown signal, exiting gracefully");
                return;
            }

            let step = translate(event, connected);
            connected = step.connected;

            if !forward(&event_sender, step.events, &shutdown_signal) {
                return;
            }

            match step.action {
                PumpAction::Continue => {}
                PumpAction::AwaitReconnectRequest => {
                    // 连接中断时等待会话请求重连
                    if !wait_for_reconnect_request(&reconnect_requested, &shutdown_signal) {
                        info!("MQTT thread stopping while disconnected");
                        return;
                    }
                    thread::sleep(reconnect_delay);
                    if !forward(&event_sender, vec![BrokerEvent::Reconnecting], &shutdown_signal) {
                        return;
                    }
                }
                PumpAction::RetryAfterDelay => {
                    // 离线时由客户端自行重试，不通知会话重新订阅
                    thread::sleep(reconnect_delay);
                }
            }
        }

        warn!("MQTT event loop ended");
    }
}

fn wait_for_reconnect_request(reconnect_requested: &AtomicBool, shutdown_signal: &AtomicBool) -> bool {
    while !shutdown_signal.load(Ordering::Relaxed) {
        if reconnect_requested.swap(false, Ordering::Relaxed) {
            return true;
        }
        thread::sleep(RECONNECT_POLL_INTERVAL);
    }
    false
}

/// Returns false once the session side of the channel is gone or shutdown is signalled
fn forward(sender: &Sender<BrokerEvent>, events: Vec<BrokerEvent>, shutdown_signal: &AtomicBool) -> bool {
    for mut event in events {
        loop {
            match sender.send_timeout(event, FORWARD_TIMEOUT) {
                Ok(()) => break,
                Err(SendTimeoutError::Timeout(pending)) => {
                    if shutdown_signal.load(Ordering::Relaxed) {
                        info!("MQTT thread dropping events on shutdown");
                        return false;
                    }
                    event = pending;
                }
                Err(SendTimeoutError::Disconnected(_)) => {
                    // 通道断开表示会话已结束，优雅退出
                    info!("Broker event channel disconnected, MQTT thread exiting");
                    return false;
                }
            }
        }
    }
    true
}
