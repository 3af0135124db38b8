use tracing::{debug, trace};

use crate::config::{DashboardConfig, ThresholdConfig};
use crate::dashboard::clock::{Clock, SystemClock};
use crate::dashboard::widgets::{BarChart, Gauge, LineChart};
use crate::metrics::{CounterSample, MetricSnapshot, ThroughputRates};

/// What a single [`ChartUpdater::apply`] changed besides the gauges.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UpdateOutcome {
    /// Rates appended to the line charts, if a rate was computable
    pub rates: Option<ThroughputRates>,
    /// Whether the disk-usage bars were replaced
    pub disks_replaced: bool,
}

/// Turns a stream of snapshots into chart-ready widget state.
///
/// The only state carried between snapshots, apart from the widgets, is the
/// previous counter sample used to derive rates.
pub struct ChartUpdater {
    thresholds: ThresholdConfig,
    cpu: Gauge,
    memory: Gauge,
    network: LineChart,
    disk_io: LineChart,
    disk_usage: BarChart,
    previous: Option<CounterSample>,
    last_update: Option<String>,
    clock: Box<dyn Clock>,
}

impl ChartUpdater {
    pub fn new(config: &DashboardConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: &DashboardConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            thresholds: config.thresholds,
            cpu: Gauge::new("CPU Usage"),
            memory: Gauge::new("Memory Usage"),
            network: LineChart::network(config.window_size),
            disk_io: LineChart::disk_io(config.window_size),
            disk_usage: BarChart::new("Disk Usage %"),
            previous: None,
            last_update: None,
            clock,
        }
    }

    /// Apply one snapshot to every widget.
    ///
    /// Phases run in a fixed order and never return early: the baseline for
    /// the next rate is replaced even when no rate could be computed.
    pub fn apply(&mut self, snapshot: &MetricSnapshot) -> UpdateOutcome {
        let label = self.clock.time_label();
        let current = CounterSample::from_snapshot(snapshot, self.clock.now_seconds());

        self.cpu.set(snapshot.cpu.utilisation, &self.thresholds);
        self.memory.set(snapshot.memory.utilisation, &self.thresholds);

        let rates = self
            .previous
            .as_ref()
            .and_then(|previous| current.rates_since(previous));
        match rates {
            Some(rates) => {
                self.network
                    .push(label.clone(), [rates.bytes_sent, rates.bytes_recv]);
                self.disk_io
                    .push(label.clone(), [rates.read_bytes, rates.write_bytes]);
                trace!(?rates, "Appended throughput rates");
            }
            None => debug!(
                timestamp = current.timestamp,
                "Not enough history for a rate; skipping line charts"
            ),
        }

        let disks_replaced = !snapshot.disks.is_empty();
        if disks_replaced {
            self.disk_usage.replace(
                snapshot
                    .disks
                    .iter()
                    .map(|disk| (disk.mountpoint.clone(), disk.utilisation)),
            );
        }

        self.previous = Some(current);
        self.last_update = Some(label);

        UpdateOutcome {
            rates,
            disks_replaced,
        }
    }

    pub fn cpu(&self) -> &Gauge {
        &self.cpu
    }

    pub fn memory(&self) -> &Gauge {
        &self.memory
    }

    pub fn network(&self) -> &LineChart {
        &self.network
    }

    pub fn disk_io(&self) -> &LineChart {
        &self.disk_io
    }

    pub fn disk_usage(&self) -> &BarChart {
        &self.disk_usage
    }

    /// Counter baseline for the next rate.
    pub fn previous(&self) -> Option<&CounterSample> {
        self.previous.as_ref()
    }

    /// Time of day of the last processed snapshot.
    pub fn last_update(&self) -> Option<&str> {
        self.last_update.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::widgets::GaugeLevel;
    use crate::metrics::{
        CpuStats, DiskIoCounters, DiskUsage, MemoryStats, NetworkCounters,
    };
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    /// Clock at a fixed instant that numbers its labels `t1`, `t2`, ...
    struct TickClock {
        seconds: f64,
        ticks: Arc<AtomicU64>,
    }

    impl Clock for TickClock {
        fn now_seconds(&self) -> f64 {
            self.seconds
        }

        fn time_label(&self) -> String {
            format!("t{}", self.ticks.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    fn updater() -> ChartUpdater {
        updater_with_window(60)
    }

    fn updater_with_window(window_size: usize) -> ChartUpdater {
        let config = DashboardConfig {
            window_size,
            ..Default::default()
        };
        let clock = TickClock {
            seconds: 5_000.0,
            ticks: Arc::new(AtomicU64::new(0)),
        };
        ChartUpdater::with_clock(&config, Box::new(clock))
    }

    fn snapshot(timestamp: Option<f64>, sent: u64, recv: u64, read: u64, write: u64) -> MetricSnapshot {
        MetricSnapshot {
            timestamp,
            cpu: CpuStats {
                utilisation: 50.0,
                count: 4,
            },
            memory: MemoryStats {
                utilisation: 60.0,
                total_bytes: 0,
            },
            network: NetworkCounters {
                bytes_sent: sent,
                bytes_recv: recv,
            },
            disk_io: DiskIoCounters {
                read_bytes: read,
                write_bytes: write,
            },
            disks: Vec::new(),
        }
    }

    #[test]
    fn test_first_snapshot_has_no_rate() {
        let mut updater = updater();
        let outcome = updater.apply(&snapshot(Some(100.0), 1000, 2000, 500, 300));

        assert!(outcome.rates.is_none());
        assert!(updater.network().is_empty());
        assert!(updater.disk_io().is_empty());
        assert_eq!(updater.previous().unwrap().timestamp, 100.0);
        assert_eq!(updater.last_update(), Some("t1"));
    }

    #[test]
    fn test_worked_example() {
        let mut updater = updater();
        updater.apply(&snapshot(Some(100.0), 1000, 2000, 500, 300));
        let outcome = updater.apply(&snapshot(Some(101.0), 1500, 2300, 500, 300));

        let rates = outcome.rates.unwrap();
        assert_eq!(rates.bytes_sent, 500.0);
        assert_eq!(rates.bytes_recv, 300.0);

        let network = updater.network();
        assert_eq!(network.len(), 1);
        assert_eq!(network.datasets()[0].latest(), Some(500.0));
        assert_eq!(network.datasets()[1].latest(), Some(300.0));
        assert_eq!(network.labels().latest().map(String::as_str), Some("t2"));
        assert_eq!(updater.disk_io().datasets()[0].latest(), Some(0.0));

        assert_eq!(updater.cpu().data(), [50.0, 50.0]);
        assert_eq!(updater.cpu().level, GaugeLevel::Nominal);
        assert_eq!(updater.memory().data(), [60.0, 40.0]);
    }

    #[test]
    fn test_wrongly_typed_field_still_yields_rate() {
        let mut updater = updater();
        updater.apply(&snapshot(Some(100.0), 1000, 2000, 500, 300));

        let next = MetricSnapshot::decode(
            r#"{"timestamp": 101, "network": {"bytes_sent": 1500, "bytes_recv": 2300}, "disk_io": {"read_bytes": 500, "write_bytes": 300}, "cpu": {"utilisation": "n/a"}}"#,
        )
        .unwrap();
        let rates = updater.apply(&next).rates.unwrap();

        assert_eq!(rates.bytes_sent, 500.0);
        assert_eq!(updater.network().datasets()[0].latest(), Some(500.0));
        assert_eq!(updater.cpu().data(), [0.0, 100.0]);
    }

    #[test]
    fn test_counter_reset_reads_as_zero() {
        let mut updater = updater();
        updater.apply(&snapshot(Some(10.0), 9000, 9000, 9000, 9000));
        let rates = updater
            .apply(&snapshot(Some(12.0), 100, 9400, 0, 9000))
            .rates
            .unwrap();

        assert_eq!(rates.bytes_sent, 0.0);
        assert_eq!(rates.bytes_recv, 200.0);
        assert_eq!(rates.read_bytes, 0.0);
        assert_eq!(rates.write_bytes, 0.0);
    }

    #[test]
    fn test_non_positive_delta_skips_rate_but_moves_baseline() {
        let mut updater = updater();
        updater.apply(&snapshot(Some(100.0), 1000, 1000, 1000, 1000));

        let duplicate = updater.apply(&snapshot(Some(100.0), 2000, 2000, 2000, 2000));
        assert!(duplicate.rates.is_none());
        assert!(updater.network().is_empty());
        assert_eq!(updater.previous().unwrap().network.bytes_sent, 2000);

        let backwards = updater.apply(&snapshot(Some(90.0), 3000, 3000, 3000, 3000));
        assert!(backwards.rates.is_none());
        assert!(updater.disk_io().is_empty());
        assert_eq!(updater.previous().unwrap().timestamp, 90.0);

        // The skipped snapshot is the baseline for the next delta.
        let rates = updater
            .apply(&snapshot(Some(92.0), 3100, 3000, 3000, 3400))
            .rates
            .unwrap();
        assert_eq!(rates.bytes_sent, 50.0);
        assert_eq!(rates.write_bytes, 200.0);
        assert_eq!(updater.network().len(), 1);
    }

    #[test]
    fn test_missing_timestamp_uses_clock() {
        let mut updater = updater();
        updater.apply(&snapshot(None, 0, 0, 0, 0));
        assert_eq!(updater.previous().unwrap().timestamp, 5_000.0);

        let rates = updater
            .apply(&snapshot(Some(5_002.0), 100, 0, 0, 0))
            .rates
            .unwrap();
        assert_eq!(rates.bytes_sent, 50.0);
    }

    #[test]
    fn test_window_capped_and_aligned() {
        let mut updater = updater();
        for i in 0..62u64 {
            updater.apply(&snapshot(Some(i as f64), i * 10, i * 20, 0, 0));
        }

        // 61 rates were produced; the first one was evicted.
        let network = updater.network();
        assert_eq!(network.len(), 60);
        assert_eq!(network.datasets()[0].values().len(), 60);
        assert_eq!(network.datasets()[1].values().len(), 60);
        assert_eq!(updater.disk_io().len(), 60);
        assert_eq!(network.labels().iter().next().map(String::as_str), Some("t3"));
        assert_eq!(network.labels().latest().map(String::as_str), Some("t62"));
    }

    #[test]
    fn test_configured_window_size() {
        let mut updater = updater_with_window(3);
        for i in 0..10u64 {
            updater.apply(&snapshot(Some(i as f64), i, i, i, i));
        }
        assert_eq!(updater.network().len(), 3);
    }

    #[test]
    fn test_disk_bars_replaced_only_when_present() {
        let mut updater = updater();
        let mut first = snapshot(Some(1.0), 0, 0, 0, 0);
        first.disks = vec![
            DiskUsage {
                mountpoint: "/".to_string(),
                utilisation: 41.0,
                total_bytes: 0,
            },
            DiskUsage {
                mountpoint: "/home".to_string(),
                utilisation: 77.5,
                total_bytes: 0,
            },
        ];
        assert!(updater.apply(&first).disks_replaced);
        assert_eq!(updater.disk_usage().labels, vec!["/", "/home"]);
        assert_eq!(updater.disk_usage().values, vec![41.0, 77.5]);

        let outcome = updater.apply(&snapshot(Some(2.0), 0, 0, 0, 0));
        assert!(!outcome.disks_replaced);
        assert_eq!(updater.disk_usage().labels, vec!["/", "/home"]);

        let mut third = snapshot(Some(3.0), 0, 0, 0, 0);
        third.disks = vec![DiskUsage {
            mountpoint: "/data".to_string(),
            utilisation: 12.0,
            total_bytes: 0,
        }];
        updater.apply(&third);
        assert_eq!(updater.disk_usage().labels, vec!["/data"]);
        assert_eq!(updater.disk_usage().values, vec![12.0]);
    }

    #[test]
    fn test_gauge_tiers_follow_latest_value() {
        let mut updater = updater();
        let mut hot = snapshot(Some(1.0), 0, 0, 0, 0);
        hot.cpu.utilisation = 95.0;
        hot.memory.utilisation = 71.0;
        updater.apply(&hot);
        assert_eq!(updater.cpu().level, GaugeLevel::Critical);
        assert_eq!(updater.memory().level, GaugeLevel::Warning);

        updater.apply(&snapshot(Some(2.0), 0, 0, 0, 0));
        assert_eq!(updater.cpu().level, GaugeLevel::Nominal);
        assert_eq!(updater.memory().level, GaugeLevel::Nominal);
    }
}
