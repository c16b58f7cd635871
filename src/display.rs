use crate::telemetry::{MetricSeries, TelemetryState};
use crate::types::Metric;
use crate::utils::format_timestamp;

/// Readout shown before the first sample of a metric arrives
pub const EMPTY_READOUT: &str = "--";

/// 格式化数字为固定宽度的 y 轴标签
pub fn format_fixed_width_y_label(value: f64) -> String {
    let abs_value = value.abs();
    if abs_value >= 1000.0 {
        format!("{:-6.1e}", value)
    } else if abs_value >= 100.0 {
        format!("{:-6.0}", value)
    } else if abs_value >= 10.0 {
        format!("{:-6.1}", value)
    } else {
        format!("{:-6.2}", value)
    }
}

/// Chart-ready view of one metric
#[derive(Debug, Clone, PartialEq)]
pub struct MetricPanel {
    pub metric: Metric,
    pub title: String,
    pub readout: String,
    /// `[index, value]`, oldest sample at x = 0
    pub points: Vec<[f64; 2]>,
    pub y_range: Option<(f64, f64)>,
    pub y_labels: Option<(String, String)>,
    pub last_update: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub panels: Vec<MetricPanel>,
}

impl Dashboard {
    pub fn panel(&self, metric: Metric) -> Option<&MetricPanel> {
        self.panels.iter().find(|panel| panel.metric == metric)
    }

    /// All three readouts on one line, e.g. `HR 72.46 bpm | SpO2 98.1 % | Temp 36.98 °C`
    pub fn summary_line(&self) -> String {
        self.panels
            .iter()
            .map(|panel| format!("{} {}", short_name(panel.metric), panel.readout))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

fn short_name(metric: Metric) -> &'static str {
    match metric {
        Metric::HeartRate => "HR",
        Metric::SpO2 => "SpO2",
        Metric::BodyTemperature => "Temp",
    }
}

pub fn readout(value: Option<f64>, metric: Metric) -> String {
    match value {
        Some(value) => format!("{} {}", value, metric.unit()),
        None => EMPTY_READOUT.to_string(),
    }
}

/// Padded vertical range so a flat series still gets a visible band
pub fn padded_range(series: &MetricSeries) -> Option<(f64, f64)> {
    let (y_min, y_max) = series.bounds()?;
    let range = (y_max - y_min).max(0.1);
    Some((y_min - range * 0.05, y_max + range * 0.05))
}

pub fn project_series(series: &MetricSeries) -> MetricPanel {
    let metric = series.metric();
    let points = series
        .values()
        .iter()
        .enumerate()
        .map(|(i, &y)| [i as f64, y])
        .collect();
    let y_range = padded_range(series);

    MetricPanel {
        metric,
        title: format!("{} ({})", metric.label(), metric.unit()),
        readout: readout(series.latest(), metric),
        points,
        y_range,
        y_labels: y_range.map(|(lo, hi)| (format_fixed_width_y_label(lo), format_fixed_width_y_label(hi))),
        last_update: series.last_updated().map(format_timestamp),
    }
}

pub fn project(state: &TelemetryState) -> Dashboard {
    Dashboard {
        panels: Metric::ALL
            .iter()
            .map(|&metric| project_series(state.series(metric)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Reading;

    #[test]
    fn test_empty_state_projection() {
        let dashboard = project(&TelemetryState::new(10));

        assert_eq!(dashboard.panels.len(), 3);
        for panel in &dashboard.panels {
            assert_eq!(panel.readout, EMPTY_READOUT);
            assert!(panel.points.is_empty());
            assert_eq!(panel.y_range, None);
            assert_eq!(panel.last_update, None);
        }
        assert_eq!(dashboard.summary_line(), "HR -- | SpO2 -- | Temp --");
    }

    #[test]
    fn test_projection_after_readings() {
        let mut state = TelemetryState::new(10);
        state.apply(
            &[
                Reading::new(Metric::HeartRate, 72.456, 0),
                Reading::new(Metric::SpO2, 98.1, 0),
            ],
            2,
        );
        state.apply(&[Reading::new(Metric::HeartRate, 75.0, 1_000)], 2);
        state.apply(&[Reading::new(Metric::BodyTemperature, 36.98, 2_000)], 2);

        let dashboard = project(&state);
        let heart = dashboard.panel(Metric::HeartRate).unwrap();

        assert_eq!(heart.readout, "75 bpm");
        assert_eq!(heart.points, vec![[0.0, 72.46], [1.0, 75.0]]);
        assert_eq!(heart.title, "Heart Rate (bpm)");
        assert_eq!(heart.last_update.as_deref(), Some("00:00:01.000"));
        assert_eq!(
            dashboard.summary_line(),
            "HR 75 bpm | SpO2 98.1 % | Temp 36.98 °C"
        );
    }

    #[test]
    fn test_flat_series_range_is_padded() {
        let mut series = MetricSeries::new(Metric::SpO2, 10);
        series.push(98.0, 0);
        series.push(98.0, 1);

        let (lo, hi) = padded_range(&series).unwrap();
        assert!(lo < 98.0 && hi > 98.0);
        assert!((hi - lo - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_width_labels() {
        assert_eq!(format_fixed_width_y_label(72.46), "  72.5");
        assert_eq!(format_fixed_width_y_label(150.0), "   150");
        assert_eq!(format_fixed_width_y_label(1.5).len(), 6);
    }
}
