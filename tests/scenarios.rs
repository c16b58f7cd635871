use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use crossbeam_channel::bounded;

use vitalshub::config::{AppConfig, PolicyConfig};
use vitalshub::mqtt::{BrokerControl, MqttError};
use vitalshub::telemetry::{AcceptAll, HeartRateCeiling, TelemetryDecoder};
use vitalshub::{BrokerEvent, IngestOutcome, Metric, Session, TelemetryIngestor};

const HEALTH: &str = "sensor/health";
const TEMPERATURE: &str = "sensor/temperature";

#[derive(Clone, Default)]
struct FakeBroker {
    subscriptions: Arc<Mutex<Vec<String>>>,
    reconnects: Arc<Mutex<usize>>,
}

impl BrokerControl for FakeBroker {
    fn subscribe(&self, topic: &str) -> Result<(), MqttError> {
        self.subscriptions.lock().unwrap().push(topic.to_string());
        Ok(())
    }

    fn request_reconnect(&self) -> Result<(), MqttError> {
        *self.reconnects.lock().unwrap() += 1;
        Ok(())
    }

    fn disconnect(&self) -> Result<(), MqttError> {
        Ok(())
    }
}

fn plain() -> TelemetryIngestor {
    TelemetryIngestor::new(TelemetryDecoder::default(), Box::new(AcceptAll), 10, 2)
}

fn gated() -> TelemetryIngestor {
    TelemetryIngestor::new(TelemetryDecoder::default(), Box::new(HeartRateCeiling::default()), 10, 2)
}

fn snapshot(ingest: &TelemetryIngestor) -> Vec<(Option<f64>, Vec<f64>)> {
    Metric::ALL
        .iter()
        .map(|&m| {
            let series = ingest.state().series(m);
            (series.latest(), series.to_vec())
        })
        .collect()
}

#[test]
fn test_scenario_health_message_rounds() {
    let mut ingest = plain();
    ingest.handle_message(HEALTH, br#"{"heart_rate":72.456,"spo2":98.1}"#);

    let state = ingest.state();
    assert_eq!(state.latest(Metric::HeartRate), Some(72.46));
    assert_eq!(state.latest(Metric::SpO2), Some(98.1));
    assert_eq!(state.series(Metric::HeartRate).to_vec(), vec![72.46]);
    assert_eq!(state.series(Metric::SpO2).to_vec(), vec![98.1]);
}

#[test]
fn test_scenario_temperature_message() {
    let mut ingest = plain();
    ingest.handle_message(TEMPERATURE, br#"{"celsius":36.98}"#);
    assert_eq!(ingest.state().latest(Metric::BodyTemperature), Some(36.98));
}

#[test]
fn test_scenario_variant_policy_rejects_pair() {
    let mut ingest = gated();
    ingest.handle_message(HEALTH, br#"{"heart_rate":70,"spo2":97}"#);
    let before = snapshot(&ingest);

    let outcome = ingest.handle_message(HEALTH, br#"{"heart_rate":180,"spo2":99}"#);
    assert!(matches!(outcome, IngestOutcome::Rejected { .. }));
    assert_eq!(snapshot(&ingest), before);

    ingest.handle_message(HEALTH, br#"{"heart_rate":150,"spo2":99}"#);
    assert_eq!(snapshot(&ingest), before);
}

#[test]
fn test_scenario_unknown_topic() {
    let mut ingest = plain();
    let before = snapshot(&ingest);
    let outcome = ingest.handle_message("sensor/unknown", br#"{"heart_rate":72,"spo2":98}"#);

    assert_eq!(outcome, IngestOutcome::Ignored);
    assert_eq!(snapshot(&ingest), before);
}

#[test]
fn test_malformed_json_leaves_everything_unchanged() {
    let mut ingest = plain();
    ingest.handle_message(HEALTH, br#"{"heart_rate":61,"spo2":95}"#);
    ingest.handle_message(TEMPERATURE, br#"{"celsius":36.4}"#);
    let before = snapshot(&ingest);

    for (topic, payload) in [(HEALTH, &b"{\"heart_rate\":"[..]), (TEMPERATURE, &b"celsius=37"[..])] {
        let outcome = ingest.handle_message(topic, payload);
        assert!(matches!(outcome, IngestOutcome::Malformed(_)));
    }
    assert_eq!(snapshot(&ingest), before);
}

#[test]
fn test_history_holds_last_ten_in_order() {
    let mut ingest = plain();
    let values: Vec<f64> = (0..23).map(|i| 60.0 + i as f64 * 0.5).collect();
    for v in &values {
        let payload = format!(r#"{{"heart_rate":{},"spo2":98}}"#, v);
        ingest.handle_message(HEALTH, payload.as_bytes());
    }

    let series = ingest.state().series(Metric::HeartRate);
    assert_eq!(series.len(), 10);
    assert_eq!(series.to_vec(), values[values.len() - 10..].to_vec());
    assert_eq!(series.latest(), values.last().copied());
}

#[test]
fn test_rounding_is_stable_across_repeats() {
    let mut ingest = plain();
    let payload = br#"{"celsius":37.126}"#;
    ingest.handle_message(TEMPERATURE, payload);
    let first = ingest.state().latest(Metric::BodyTemperature);
    ingest.handle_message(TEMPERATURE, payload);

    assert_eq!(first, Some(37.13));
    assert_eq!(ingest.state().latest(Metric::BodyTemperature), first);
}

#[test]
fn test_extreme_reading_keeps_display_finite() {
    let mut ingest = plain();
    ingest.handle_message(TEMPERATURE, br#"{"celsius":1e307}"#);

    let series = ingest.state().series(Metric::BodyTemperature);
    assert_eq!(series.latest(), Some(1e307));
    assert!(series.to_vec().iter().all(|v| v.is_finite()));
}

#[test]
fn test_zero_readings_update_latest_and_history() {
    let mut ingest = plain();
    ingest.handle_message(HEALTH, br#"{"heart_rate":0,"spo2":0}"#);

    assert_eq!(ingest.state().latest(Metric::HeartRate), Some(0.0));
    assert_eq!(ingest.state().series(Metric::SpO2).to_vec(), vec![0.0]);
}

#[test]
fn test_session_over_channel_from_config() {
    let mut config = AppConfig::default();
    config.telemetry.policy = PolicyConfig::HeartRateCeiling { max_heart_rate: 150.0 };

    let broker = FakeBroker::default();
    let mut session = Session::new(broker.clone(), TelemetryIngestor::from_config(&config), 0);

    let (sender, receiver) = bounded(16);
    for event in [
        BrokerEvent::Connected,
        BrokerEvent::message(HEALTH, br#"{"heart_rate":72.456,"spo2":98.1}"#.to_vec()),
        BrokerEvent::message(HEALTH, br#"{"heart_rate":180,"spo2":99}"#.to_vec()),
        BrokerEvent::Error("connection reset".to_string()),
        BrokerEvent::Closed,
        BrokerEvent::Reconnecting,
        BrokerEvent::Connected,
        BrokerEvent::message(TEMPERATURE, br#"{"celsius":36.98}"#.to_vec()),
        BrokerEvent::message("sensor/unknown", b"{}".to_vec()),
    ] {
        sender.send(event).unwrap();
    }
    drop(sender);

    let stats = session.run(&receiver, &AtomicBool::new(false));

    assert_eq!(stats.received, 4);
    assert_eq!(stats.accepted, 2);
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.ignored, 1);
    assert_eq!(*broker.reconnects.lock().unwrap(), 1);
    assert_eq!(broker.subscriptions.lock().unwrap().len(), 6);

    let dashboard = session.dashboard();
    assert_eq!(dashboard.summary_line(), "HR 72.46 bpm | SpO2 98.1 % | Temp 36.98 °C");
}
