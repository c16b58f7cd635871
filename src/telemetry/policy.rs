use serde::{Deserialize, Serialize};

use crate::config::PolicyConfig;
use crate::types::{Metric, Reading};

/// Decides whether a decoded reading may be written into its series.
///
/// Readings from one message are screened together: if any of them is
/// rejected the whole message is dropped.
pub trait AcceptancePolicy: Send {
    fn name(&self) -> &'static str;

    fn accept(&self, reading: &Reading) -> bool;

    /// Returns the first reading of a message the policy turns down
    fn screen<'a>(&self, readings: &'a [Reading]) -> Option<&'a Reading> {
        readings.iter().find(|reading| !self.accept(reading))
    }
}

/// Accepts any finite value, zero included
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl AcceptancePolicy for AcceptAll {
    fn name(&self) -> &'static str {
        "accept_all"
    }

    fn accept(&self, reading: &Reading) -> bool {
        reading.value.is_finite()
    }
}

/// Treats heart rates at or above `max` as sensor artifacts
#[derive(Debug, Clone, Copy)]
pub struct HeartRateCeiling {
    pub max: f64,
}

impl Default for HeartRateCeiling {
    fn default() -> Self {
        Self { max: 150.0 }
    }
}

impl AcceptancePolicy for HeartRateCeiling {
    fn name(&self) -> &'static str {
        "heart_rate_ceiling"
    }

    fn accept(&self, reading: &Reading) -> bool {
        reading.value.is_finite() && (reading.metric != Metric::HeartRate || reading.value < self.max)
    }
}

/// Half-open `[min, max)` bound
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value < self.max
    }
}

/// Optional bound per metric; metrics without a bound behave like `AcceptAll`
#[derive(Debug, Clone, Copy, Default)]
pub struct RangePolicy {
    pub heart_rate: Option<ValueRange>,
    pub spo2: Option<ValueRange>,
    pub body_temperature: Option<ValueRange>,
}

impl RangePolicy {
    fn range_for(&self, metric: Metric) -> Option<&ValueRange> {
        match metric {
            Metric::HeartRate => self.heart_rate.as_ref(),
            Metric::SpO2 => self.spo2.as_ref(),
            Metric::BodyTemperature => self.body_temperature.as_ref(),
        }
    }
}

impl AcceptancePolicy for RangePolicy {
    fn name(&self) -> &'static str {
        "ranges"
    }

    fn accept(&self, reading: &Reading) -> bool {
        reading.value.is_finite()
            && self
                .range_for(reading.metric)
                .map_or(true, |range| range.contains(reading.value))
    }
}

/// 根据配置创建接收策略
pub fn policy_from_config(config: &PolicyConfig) -> Box<dyn AcceptancePolicy> {
    match config {
        PolicyConfig::AcceptAll => Box::new(AcceptAll),
        PolicyConfig::HeartRateCeiling { max_heart_rate } => Box::new(HeartRateCeiling { max: *max_heart_rate }),
        PolicyConfig::Ranges { heart_rate, spo2, body_temperature } => Box::new(RangePolicy {
            heart_rate: *heart_rate,
            spo2: *spo2,
            body_temperature: *body_temperature,
        }),
    }
}
