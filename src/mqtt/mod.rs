pub mod client;
pub mod control;

pub use client::{connect, EventPump, MqttControl};
pub use control::{qos_from_level, BrokerControl, MqttError};
