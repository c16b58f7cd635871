use std::fmt;

/// 被监测的生命体征指标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    HeartRate,
    SpO2,
    BodyTemperature,
}

impl Metric {
    /// Display order used by the dashboard panels
    pub const ALL: [Metric; 3] = [Metric::HeartRate, Metric::SpO2, Metric::BodyTemperature];

    /// JSON field the value is decoded from
    pub fn field(self) -> &'static str {
        match self {
            Metric::HeartRate => "heart_rate",
            Metric::SpO2 => "spo2",
            Metric::BodyTemperature => "celsius",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::HeartRate => "Heart Rate",
            Metric::SpO2 => "Oxygen Level",
            Metric::BodyTemperature => "Body Temperature",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::HeartRate => "bpm",
            Metric::SpO2 => "%",
            Metric::BodyTemperature => "°C",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One decoded sensor sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub metric: Metric,
    pub value: f64,
    pub received_at: i64, // 毫秒时间戳
}

impl Reading {
    pub fn new(metric: Metric, value: f64, received_at: i64) -> Self {
        Self { metric, value, received_at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_fields_match_wire_format() {
        assert_eq!(Metric::HeartRate.field(), "heart_rate");
        assert_eq!(Metric::SpO2.field(), "spo2");
        assert_eq!(Metric::BodyTemperature.field(), "celsius");
    }

    #[test]
    fn test_metric_display_uses_label() {
        assert_eq!(Metric::SpO2.to_string(), "Oxygen Level");
        assert_eq!(Metric::BodyTemperature.unit(), "°C");
    }
}
