use super::Metric;

/// Result of feeding one broker message through decode and acceptance
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Readings written into their series, with the rounded values stored
    Applied(Vec<(Metric, f64)>),
    /// Decoded fine but the acceptance policy turned the message down
    Rejected { policy: &'static str, metric: Metric, value: f64 },
    /// Nothing usable in the message (all fields missing)
    Empty,
    Malformed(String),
    Ignored,
}

impl IngestOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, IngestOutcome::Applied(_))
    }
}

/// Per-session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub received: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub malformed: u64,
    pub missing_fields: u64,
    pub ignored: u64,
}

impl SessionStats {
    pub fn record(&mut self, outcome: &IngestOutcome) {
        self.received += 1;
        match outcome {
            IngestOutcome::Applied(_) => self.accepted += 1,
            IngestOutcome::Rejected { .. } => self.rejected += 1,
            IngestOutcome::Malformed(_) => self.malformed += 1,
            IngestOutcome::Ignored => self.ignored += 1,
            IngestOutcome::Empty => {}
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "received {} / accepted {} / rejected {} / malformed {} / missing fields {} / ignored {}",
            self.received, self.accepted, self.rejected, self.malformed, self.missing_fields, self.ignored
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_count_each_outcome() {
        let mut stats = SessionStats::default();
        stats.record(&IngestOutcome::Applied(vec![(Metric::HeartRate, 70.0)]));
        stats.record(&IngestOutcome::Malformed("bad".to_string()));
        stats.record(&IngestOutcome::Ignored);
        stats.record(&IngestOutcome::Rejected {
            policy: "heart_rate_ceiling",
            metric: Metric::HeartRate,
            value: 180.0,
        });
        stats.record(&IngestOutcome::Empty);

        assert_eq!(stats.received, 5);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.ignored, 1);
        assert_eq!(stats.rejected, 1);
    }
}
