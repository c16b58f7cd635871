/// Lifecycle and data events forwarded from the broker pump to the session loop
#[derive(Debug, Clone, PartialEq)]
pub enum BrokerEvent {
    Connected,
    Reconnecting,
    Message { topic: String, payload: Vec<u8> },
    Closed,
    Offline,
    Error(String),
}

impl BrokerEvent {
    pub fn message(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self::Message {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Short name used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            BrokerEvent::Connected => "connected",
            BrokerEvent::Reconnecting => "reconnecting",
            BrokerEvent::Message { .. } => "message",
            BrokerEvent::Closed => "closed",
            BrokerEvent::Offline => "offline",
            BrokerEvent::Error(_) => "error",
        }
    }
}
