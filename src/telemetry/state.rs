use crate::types::{Metric, Reading, SessionStats};
use crate::utils::round_to;
use super::series::MetricSeries;

/// Everything one session knows about the incoming vitals.
/// Created fresh for every session and dropped with it.
#[derive(Debug, Clone)]
pub struct TelemetryState {
    heart_rate: MetricSeries,
    spo2: MetricSeries,
    body_temperature: MetricSeries,
    pub stats: SessionStats,
}

impl TelemetryState {
    pub fn new(capacity: usize) -> Self {
        Self {
            heart_rate: MetricSeries::new(Metric::HeartRate, capacity),
            spo2: MetricSeries::new(Metric::SpO2, capacity),
            body_temperature: MetricSeries::new(Metric::BodyTemperature, capacity),
            stats: SessionStats::default(),
        }
    }

    pub fn series(&self, metric: Metric) -> &MetricSeries {
        match metric {
            Metric::HeartRate => &self.heart_rate,
            Metric::SpO2 => &self.spo2,
            Metric::BodyTemperature => &self.body_temperature,
        }
    }

    fn series_mut(&mut self, metric: Metric) -> &mut MetricSeries {
        match metric {
            Metric::HeartRate => &mut self.heart_rate,
            Metric::SpO2 => &mut self.spo2,
            Metric::BodyTemperature => &mut self.body_temperature,
        }
    }

    pub fn latest(&self, metric: Metric) -> Option<f64> {
        self.series(metric).latest()
    }

    /// Rounds and appends already-accepted readings; returns what was stored
    pub fn apply(&mut self, readings: &[Reading], precision: u32) -> Vec<(Metric, f64)> {
        readings
            .iter()
            .map(|reading| {
                let value = round_to(reading.value, precision);
                self.series_mut(reading.metric).push(value, reading.received_at);
                (reading.metric, value)
            })
            .collect()
    }

    pub fn has_data(&self) -> bool {
        Metric::ALL.iter().any(|&metric| !self.series(metric).is_empty())
    }
}
