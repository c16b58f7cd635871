use serde_json::{Map, Value};

use crate::config::MqttTopics;
use crate::types::{Metric, Reading};

const HEALTH_METRICS: &[Metric] = &[Metric::HeartRate, Metric::SpO2];
const TEMPERATURE_METRICS: &[Metric] = &[Metric::BodyTemperature];

/// 解码错误类型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("Missing or non-numeric field `{field}`")]
    MissingField { field: &'static str },
    #[error("Unknown topic: {0}")]
    UnknownTopic(String),
}

/// Candidate readings extracted from one broker message.
///
/// `skipped` holds one `MissingField` per field that could not be used; the
/// remaining fields of the same message are still decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    pub readings: Vec<Reading>,
    pub skipped: Vec<DecodeError>,
}

/// Maps the fixed topic set onto metrics and turns JSON payloads into readings
#[derive(Debug, Clone)]
pub struct TelemetryDecoder {
    health_topic: String,
    temperature_topic: String,
}

impl Default for TelemetryDecoder {
    fn default() -> Self {
        Self::from_topics(&MqttTopics::default())
    }
}

impl TelemetryDecoder {
    pub fn new(health_topic: impl Into<String>, temperature_topic: impl Into<String>) -> Self {
        Self {
            health_topic: health_topic.into(),
            temperature_topic: temperature_topic.into(),
        }
    }

    pub fn from_topics(topics: &MqttTopics) -> Self {
        Self::new(topics.health.clone(), topics.temperature.clone())
    }

    /// Topics the session subscribes to, health first
    pub fn topics(&self) -> [&str; 2] {
        [self.health_topic.as_str(), self.temperature_topic.as_str()]
    }

    pub fn metrics_for(&self, topic: &str) -> Option<&'static [Metric]> {
        if topic == self.health_topic {
            Some(HEALTH_METRICS)
        } else if topic == self.temperature_topic {
            Some(TEMPERATURE_METRICS)
        } else {
            None
        }
    }

    pub fn decode(&self, topic: &str, payload: &[u8], received_at: i64) -> Result<DecodedMessage, DecodeError> {
        let metrics = self
            .metrics_for(topic)
            .ok_or_else(|| DecodeError::UnknownTopic(topic.to_string()))?;

        let object = parse_object(payload)?;

        let mut decoded = DecodedMessage {
            readings: Vec::with_capacity(metrics.len()),
            skipped: Vec::new(),
        };

        for &metric in metrics {
            match numeric_field(&object, metric.field()) {
                Some(value) => decoded.readings.push(Reading::new(metric, value, received_at)),
                None => decoded.skipped.push(DecodeError::MissingField { field: metric.field() }),
            }
        }

        Ok(decoded)
    }
}

fn parse_object(payload: &[u8]) -> Result<Map<String, Value>, DecodeError> {
    let payload_str = std::str::from_utf8(payload)
        .map_err(|e| DecodeError::MalformedPayload(format!("Invalid UTF-8: {}", e)))?;

    match serde_json::from_str::<Value>(payload_str) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(other) => Err(DecodeError::MalformedPayload(format!("expected JSON object, got {}", other))),
        Err(e) => Err(DecodeError::MalformedPayload(format!("JSON parsing error: {}", e))),
    }
}

fn numeric_field(object: &Map<String, Value>, field: &str) -> Option<f64> {
    object
        .get(field)
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite())
}
