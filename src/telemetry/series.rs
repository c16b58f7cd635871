use std::collections::VecDeque;

use crate::types::Metric;

/// Number of samples kept per metric unless configured otherwise
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Bounded FIFO history of accepted values for one metric
#[derive(Debug, Clone)]
pub struct MetricSeries {
    metric: Metric,
    capacity: usize,
    values: VecDeque<f64>,
    latest: Option<f64>,
    last_updated: Option<i64>,
}

impl MetricSeries {
    pub fn new(metric: Metric, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            metric,
            capacity,
            values: VecDeque::with_capacity(capacity),
            latest: None,
            last_updated: None,
        }
    }

    pub fn push(&mut self, value: f64, received_at: i64) {
        // 超过容量时移除最旧的数据
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
        self.latest = Some(value);
        self.last_updated = Some(received_at);
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<f64> {
        self.latest
    }

    pub fn last_updated(&self) -> Option<i64> {
        self.last_updated
    }

    pub fn values(&self) -> &VecDeque<f64> {
        &self.values
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// (min, max) over the held values
    pub fn bounds(&self) -> Option<(f64, f64)> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(min, max), &val| (min.min(val), max.max(val)),
        ))
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.latest = None;
        self.last_updated = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_last_ten() {
        let mut series = MetricSeries::new(Metric::HeartRate, DEFAULT_HISTORY_CAPACITY);
        for i in 0..25 {
            series.push(i as f64, i);
        }

        assert_eq!(series.len(), 10);
        assert_eq!(series.to_vec(), (15..25).map(|i| i as f64).collect::<Vec<_>>());
        assert_eq!(series.latest(), Some(24.0));
        assert_eq!(series.last_updated(), Some(24));
    }

    #[test]
    fn test_latest_matches_last_value() {
        let mut series = MetricSeries::new(Metric::SpO2, 3);
        assert_eq!(series.latest(), None);
        series.push(97.0, 1);
        series.push(98.5, 2);
        assert_eq!(series.latest(), series.values().back().copied());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut series = MetricSeries::new(Metric::BodyTemperature, 0);
        series.push(36.5, 0);
        series.push(36.6, 1);
        assert_eq!(series.capacity(), 1);
        assert_eq!(series.to_vec(), vec![36.6]);
    }

    #[test]
    fn test_bounds_and_clear() {
        let mut series = MetricSeries::new(Metric::HeartRate, 10);
        assert_eq!(series.bounds(), None);
        series.push(80.0, 0);
        series.push(62.0, 1);
        series.push(71.0, 2);
        assert_eq!(series.bounds(), Some((62.0, 80.0)));

        series.clear();
        assert!(series.is_empty());
        assert_eq!(series.latest(), None);
    }
}
