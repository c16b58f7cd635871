use rumqttc::QoS;

/// MQTT 错误类型
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    #[error("MQTT client error: {0}")]
    Client(#[from] rumqttc::ClientError),
    #[error("Invalid QoS level: {0}")]
    InvalidQos(u8),
}

/// What the session may ask of the broker connection
pub trait BrokerControl {
    fn subscribe(&self, topic: &str) -> Result<(), MqttError>;

    /// Asks the connection manager to reconnect after a closed connection
    fn request_reconnect(&self) -> Result<(), MqttError>;

    fn disconnect(&self) -> Result<(), MqttError>;
}

pub fn qos_from_level(level: u8) -> Result<QoS, MqttError> {
    match level {
        0 => Ok(QoS::AtMostOnce),
        1 => Ok(QoS::AtLeastOnce),
        2 => Ok(QoS::ExactlyOnce),
        other => Err(MqttError::InvalidQos(other)),
    }
}
