use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, error, info, warn};

use crate::display::{project, Dashboard};
use crate::mqtt::BrokerControl;
use crate::telemetry::TelemetryIngestor;
use crate::types::{BrokerEvent, IngestOutcome, SessionStats};

const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// One connection lifetime: the only consumer of broker events and the only
/// writer of the telemetry state.
pub struct Session<C: BrokerControl> {
    control: C,
    ingestor: TelemetryIngestor,
    summary_interval: Option<Duration>,
    last_summary: Instant,
}

impl<C: BrokerControl> Session<C> {
    pub fn new(control: C, ingestor: TelemetryIngestor, summary_interval_secs: u64) -> Self {
        Self {
            control,
            ingestor,
            summary_interval: (summary_interval_secs > 0).then(|| Duration::from_secs(summary_interval_secs)),
            last_summary: Instant::now(),
        }
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    pub fn ingestor(&self) -> &TelemetryIngestor {
        &self.ingestor
    }

    pub fn stats(&self) -> SessionStats {
        self.ingestor.state().stats
    }

    pub fn dashboard(&self) -> Dashboard {
        project(self.ingestor.state())
    }

    /// Consumes events in arrival order until shutdown or until the pump hangs up
    pub fn run(&mut self, receiver: &Receiver<BrokerEvent>, shutdown_signal: &AtomicBool) -> SessionStats {
        info!(
            "Session started, policy {}, topics {:?}",
            self.ingestor.policy_name(),
            self.ingestor.decoder().topics()
        );

        while !shutdown_signal.load(Ordering::Relaxed) {
            match receiver.recv_timeout(RECV_TIMEOUT) {
                Ok(event) => {
                    self.handle_event(event);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    info!("Broker event channel closed, ending session");
                    break;
                }
            }
            self.maybe_log_summary();
        }

        let stats = self.stats();
        info!("Session ended: {}", stats.summary());
        stats
    }

    pub fn handle_event(&mut self, event: BrokerEvent) -> Option<IngestOutcome> {
        match event {
            BrokerEvent::Connected => {
                info!("Connected to MQTT broker");
                self.subscribe_all();
                None
            }
            BrokerEvent::Reconnecting => {
                info!("Reconnecting to MQTT broker...");
                self.subscribe_all();
                None
            }
            BrokerEvent::Message { topic, payload } => {
                debug!("Received message on topic {}: {}", topic, String::from_utf8_lossy(&payload));
                let outcome = self.ingestor.handle_message(&topic, &payload);
                if outcome.is_applied() {
                    info!("{}", self.dashboard().summary_line());
                }
                Some(outcome)
            }
            BrokerEvent::Closed => {
                info!("MQTT connection closed, reconnecting...");
                if let Err(e) = self.control.request_reconnect() {
                    error!("Failed to request reconnect: {}", e);
                }
                None
            }
            BrokerEvent::Offline => {
                warn!("MQTT is offline, trying to reconnect...");
                None
            }
            BrokerEvent::Error(e) => {
                error!("MQTT Error: {}", e);
                None
            }
        }
    }

    fn subscribe_all(&self) {
        for topic in self.ingestor.decoder().topics() {
            match self.control.subscribe(topic) {
                Ok(()) => debug!("Subscribed to {}", topic),
                Err(e) => error!("Failed to subscribe to {}: {}", topic, e),
            }
        }
    }

    fn maybe_log_summary(&mut self) {
        let Some(interval) = self.summary_interval else {
            return;
        };
        if self.last_summary.elapsed() >= interval {
            info!("{} ({})", self.dashboard().summary_line(), self.stats().summary());
            self.last_summary = Instant::now();
        }
    }
}
