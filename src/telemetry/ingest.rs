use log::{debug, warn};

use crate::config::AppConfig;
use crate::types::IngestOutcome;
use crate::utils::now_millis;
use super::decoder::{DecodeError, TelemetryDecoder};
use super::policy::{policy_from_config, AcceptancePolicy};
use super::state::TelemetryState;

/// decode → accept → append for one session
pub struct TelemetryIngestor {
    decoder: TelemetryDecoder,
    policy: Box<dyn AcceptancePolicy>,
    precision: u32,
    capacity: usize,
    state: TelemetryState,
}

impl TelemetryIngestor {
    pub fn new(decoder: TelemetryDecoder, policy: Box<dyn AcceptancePolicy>, capacity: usize, precision: u32) -> Self {
        Self {
            decoder,
            policy,
            precision,
            capacity,
            state: TelemetryState::new(capacity),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            TelemetryDecoder::from_topics(&config.mqtt.topics),
            policy_from_config(&config.telemetry.policy),
            config.telemetry.history_capacity,
            config.telemetry.precision,
        )
    }

    pub fn decoder(&self) -> &TelemetryDecoder {
        &self.decoder
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn state(&self) -> &TelemetryState {
        &self.state
    }

    /// Drops all series and counters, as at the start of a new session
    pub fn reset(&mut self) {
        self.state = TelemetryState::new(self.capacity);
    }

    pub fn handle_message(&mut self, topic: &str, payload: &[u8]) -> IngestOutcome {
        self.handle_message_at(topic, payload, now_millis())
    }

    pub fn handle_message_at(&mut self, topic: &str, payload: &[u8], received_at: i64) -> IngestOutcome {
        let outcome = self.ingest(topic, payload, received_at);
        self.state.stats.record(&outcome);
        outcome
    }

    fn ingest(&mut self, topic: &str, payload: &[u8], received_at: i64) -> IngestOutcome {
        let decoded = match self.decoder.decode(topic, payload, received_at) {
            Ok(decoded) => decoded,
            Err(DecodeError::UnknownTopic(topic)) => {
                debug!("Ignoring message on unsubscribed topic {}", topic);
                return IngestOutcome::Ignored;
            }
            Err(e) => {
                warn!("Invalid telemetry on {}: {}", topic, e);
                return IngestOutcome::Malformed(e.to_string());
            }
        };

        for skipped in &decoded.skipped {
            warn!("Telemetry on {}: {}", topic, skipped);
        }
        self.state.stats.missing_fields += decoded.skipped.len() as u64;

        if decoded.readings.is_empty() {
            return IngestOutcome::Empty;
        }

        if let Some(rejected) = self.policy.screen(&decoded.readings) {
            debug!(
                "Policy {} rejected {} = {} on {}, dropping message",
                self.policy.name(),
                rejected.metric,
                rejected.value,
                topic
            );
            return IngestOutcome::Rejected {
                policy: self.policy.name(),
                metric: rejected.metric,
                value: rejected.value,
            };
        }

        IngestOutcome::Applied(self.state.apply(&decoded.readings, self.precision))
    }
}
