//! In-memory models of the chart widgets.
//!
//! These hold exactly what a renderer needs to draw: values, labels and
//! colors. They know nothing about the event stream.

use crate::config::ThresholdConfig;
use crate::metrics::RollingWindow;

/// Unfilled remainder of a gauge.
pub const TRACK_COLOR: &str = "#e5e7eb";

/// Color tier of a gauge value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeLevel {
    Nominal,
    Warning,
    Critical,
}

impl GaugeLevel {
    /// Tier for a utilisation percentage; both bounds are exclusive on the
    /// low side, so 70 is nominal and 90 is a warning with default thresholds.
    pub fn classify(value: f64, thresholds: &ThresholdConfig) -> Self {
        if value > thresholds.critical {
            GaugeLevel::Critical
        } else if value > thresholds.warning {
            GaugeLevel::Warning
        } else {
            GaugeLevel::Nominal
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            GaugeLevel::Nominal => "#10b981",
            GaugeLevel::Warning => "#f59e0b",
            GaugeLevel::Critical => "#ef4444",
        }
    }
}

/// Half-circle percentage gauge: a filled value and its complement.
#[derive(Debug, Clone, PartialEq)]
pub struct Gauge {
    pub label: String,
    pub value: f64,
    pub complement: f64,
    pub level: GaugeLevel,
}

impl Gauge {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: 0.0,
            complement: 100.0,
            level: GaugeLevel::Nominal,
        }
    }

    /// Set the gauge from a utilisation percentage, clamped to 0..=100.
    pub fn set(&mut self, utilisation: f64, thresholds: &ThresholdConfig) {
        let value = if utilisation.is_finite() {
            utilisation.clamp(0.0, 100.0)
        } else {
            0.0
        };
        self.value = value;
        self.complement = 100.0 - value;
        self.level = GaugeLevel::classify(value, thresholds);
    }

    /// `[value, complement]`, in drawing order.
    pub fn data(&self) -> [f64; 2] {
        [self.value, self.complement]
    }

    /// `[value color, track color]`, in drawing order.
    pub fn colors(&self) -> [&'static str; 2] {
        [self.level.color(), TRACK_COLOR]
    }
}

/// One line of a [`LineChart`].
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub color: &'static str,
    values: RollingWindow<f64>,
}

impl Dataset {
    fn new(label: impl Into<String>, color: &'static str, capacity: usize) -> Self {
        Self {
            label: label.into(),
            color,
            values: RollingWindow::new(capacity),
        }
    }

    pub fn values(&self) -> &RollingWindow<f64> {
        &self.values
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.latest().copied()
    }
}

/// Time-series chart with one shared label axis and two datasets.
///
/// Labels and both datasets are pushed together so that index `i` of each
/// refers to the same sample, including after eviction.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    labels: RollingWindow<String>,
    datasets: [Dataset; 2],
}

impl LineChart {
    pub fn new(
        title: impl Into<String>,
        capacity: usize,
        first: (&str, &'static str),
        second: (&str, &'static str),
    ) -> Self {
        Self {
            title: title.into(),
            labels: RollingWindow::new(capacity),
            datasets: [
                Dataset::new(first.0, first.1, capacity),
                Dataset::new(second.0, second.1, capacity),
            ],
        }
    }

    /// Network throughput chart as laid out on the dashboard.
    pub fn network(capacity: usize) -> Self {
        Self::new(
            "Network I/O",
            capacity,
            ("Bytes Sent/sec", "#10b981"),
            ("Bytes Received/sec", "#3b82f6"),
        )
    }

    /// Disk throughput chart as laid out on the dashboard.
    pub fn disk_io(capacity: usize) -> Self {
        Self::new(
            "Disk I/O",
            capacity,
            ("Read Bytes/sec", "#8b5cf6"),
            ("Write Bytes/sec", "#ec4899"),
        )
    }

    /// Append one sample point to the label axis and both datasets.
    pub fn push(&mut self, label: impl Into<String>, values: [f64; 2]) {
        self.labels.push(label.into());
        self.datasets[0].values.push(values[0]);
        self.datasets[1].values.push(values[1]);
    }

    pub fn labels(&self) -> &RollingWindow<String> {
        &self.labels
    }

    pub fn datasets(&self) -> &[Dataset; 2] {
        &self.datasets
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Categorical bar chart, replaced wholesale on every update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl BarChart {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            labels: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn replace<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let (labels, values) = entries.into_iter().unzip();
        self.labels = labels;
        self.values = values;
    }

    pub fn bars(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        let thresholds = ThresholdConfig::default();
        assert_eq!(GaugeLevel::classify(0.0, &thresholds), GaugeLevel::Nominal);
        assert_eq!(GaugeLevel::classify(70.0, &thresholds), GaugeLevel::Nominal);
        assert_eq!(GaugeLevel::classify(70.01, &thresholds), GaugeLevel::Warning);
        assert_eq!(GaugeLevel::classify(90.0, &thresholds), GaugeLevel::Warning);
        assert_eq!(GaugeLevel::classify(90.5, &thresholds), GaugeLevel::Critical);
        assert_eq!(GaugeLevel::classify(100.0, &thresholds), GaugeLevel::Critical);
    }

    #[test]
    fn test_gauge_complement_sums_to_100() {
        let thresholds = ThresholdConfig::default();
        let mut gauge = Gauge::new("CPU Usage");
        for value in [0.0, 12.5, 33.3, 50.0, 70.0, 87.25, 99.9, 100.0] {
            gauge.set(value, &thresholds);
            assert_eq!(gauge.value + gauge.complement, 100.0);
        }
    }

    #[test]
    fn test_gauge_colors() {
        let thresholds = ThresholdConfig::default();
        let mut gauge = Gauge::new("Memory Usage");
        gauge.set(95.0, &thresholds);
        assert_eq!(gauge.colors(), ["#ef4444", TRACK_COLOR]);
        gauge.set(75.0, &thresholds);
        assert_eq!(gauge.colors(), ["#f59e0b", TRACK_COLOR]);
    }

    #[test]
    fn test_gauge_clamps_out_of_range() {
        let thresholds = ThresholdConfig::default();
        let mut gauge = Gauge::new("CPU Usage");
        gauge.set(140.0, &thresholds);
        assert_eq!(gauge.data(), [100.0, 0.0]);
        gauge.set(-3.0, &thresholds);
        assert_eq!(gauge.data(), [0.0, 100.0]);
    }

    #[test]
    fn test_line_chart_stays_aligned_after_eviction() {
        let mut chart = LineChart::network(60);
        for i in 0..61 {
            chart.push(format!("t{}", i), [i as f64, (i * 10) as f64]);
        }

        assert_eq!(chart.len(), 60);
        assert_eq!(chart.datasets()[0].values().len(), 60);
        assert_eq!(chart.datasets()[1].values().len(), 60);
        assert_eq!(chart.labels().iter().next().map(String::as_str), Some("t1"));
        assert_eq!(chart.datasets()[0].values().iter().next(), Some(&1.0));
        assert_eq!(chart.datasets()[1].values().iter().next(), Some(&10.0));
        assert_eq!(chart.datasets()[1].latest(), Some(600.0));
    }

    #[test]
    fn test_bar_chart_replace() {
        let mut chart = BarChart::new("Disk Usage %");
        chart.replace(vec![("/".to_string(), 40.0), ("/home".to_string(), 80.0)]);
        assert_eq!(chart.labels, vec!["/", "/home"]);
        assert_eq!(chart.values, vec![40.0, 80.0]);

        chart.replace(vec![("/data".to_string(), 5.0)]);
        assert_eq!(chart.bars().collect::<Vec<_>>(), vec![("/data", 5.0)]);
    }
}
