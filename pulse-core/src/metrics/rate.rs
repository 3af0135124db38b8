use crate::metrics::types::{DiskIoCounters, MetricSnapshot, NetworkCounters};

/// Counter values seen at one instant, kept only to difference against the
/// next snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterSample {
    pub network: NetworkCounters,
    pub disk_io: DiskIoCounters,
    /// Seconds
    pub timestamp: f64,
}

/// Per-second throughput derived from two consecutive counter samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThroughputRates {
    pub bytes_sent: f64,
    pub bytes_recv: f64,
    pub read_bytes: f64,
    pub write_bytes: f64,
}

impl CounterSample {
    /// Capture the counters of a snapshot, using `fallback_timestamp` when the
    /// snapshot carries none.
    pub fn from_snapshot(snapshot: &MetricSnapshot, fallback_timestamp: f64) -> Self {
        Self {
            network: snapshot.network,
            disk_io: snapshot.disk_io,
            timestamp: snapshot.timestamp.unwrap_or(fallback_timestamp),
        }
    }

    /// Rates between `previous` and `self`.
    ///
    /// Returns `None` when no time has elapsed or the clock went backwards.
    pub fn rates_since(&self, previous: &CounterSample) -> Option<ThroughputRates> {
        let elapsed = self.timestamp - previous.timestamp;
        if elapsed <= 0.0 {
            return None;
        }

        Some(ThroughputRates {
            bytes_sent: counter_rate(self.network.bytes_sent, previous.network.bytes_sent, elapsed),
            bytes_recv: counter_rate(self.network.bytes_recv, previous.network.bytes_recv, elapsed),
            read_bytes: counter_rate(self.disk_io.read_bytes, previous.disk_io.read_bytes, elapsed),
            write_bytes: counter_rate(self.disk_io.write_bytes, previous.disk_io.write_bytes, elapsed),
        })
    }
}

/// Per-second rate of a cumulative counter, floored at zero so a counter
/// reset reads as idle rather than negative throughput.
pub fn counter_rate(current: u64, previous: u64, elapsed: f64) -> f64 {
    let delta = current as f64 - previous as f64;
    (delta / elapsed).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(sent: u64, recv: u64, read: u64, write: u64, timestamp: f64) -> CounterSample {
        CounterSample {
            network: NetworkCounters {
                bytes_sent: sent,
                bytes_recv: recv,
            },
            disk_io: DiskIoCounters {
                read_bytes: read,
                write_bytes: write,
            },
            timestamp,
        }
    }

    #[test]
    fn test_rates_over_one_second() {
        let previous = sample(1000, 2000, 500, 300, 100.0);
        let current = sample(1500, 2300, 500, 300, 101.0);

        let rates = current.rates_since(&previous).unwrap();
        assert_eq!(rates.bytes_sent, 500.0);
        assert_eq!(rates.bytes_recv, 300.0);
        assert_eq!(rates.read_bytes, 0.0);
        assert_eq!(rates.write_bytes, 0.0);
    }

    #[test]
    fn test_rates_divide_by_elapsed() {
        let previous = sample(0, 0, 0, 0, 10.0);
        let current = sample(1000, 250, 4096, 1, 14.0);

        let rates = current.rates_since(&previous).unwrap();
        assert!((rates.bytes_sent - 250.0).abs() < 1e-9);
        assert!((rates.bytes_recv - 62.5).abs() < 1e-9);
        assert!((rates.read_bytes - 1024.0).abs() < 1e-9);
        assert!((rates.write_bytes - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_counter_reset_clamps_to_zero() {
        let previous = sample(5000, 5000, 5000, 5000, 1.0);
        let current = sample(10, 5100, 0, 5000, 2.0);

        let rates = current.rates_since(&previous).unwrap();
        assert_eq!(rates.bytes_sent, 0.0);
        assert_eq!(rates.bytes_recv, 100.0);
        assert_eq!(rates.read_bytes, 0.0);
    }

    #[test]
    fn test_non_positive_elapsed_yields_nothing() {
        let previous = sample(0, 0, 0, 0, 50.0);
        assert!(sample(10, 10, 10, 10, 50.0).rates_since(&previous).is_none());
        assert!(sample(10, 10, 10, 10, 49.0).rates_since(&previous).is_none());
    }

    #[test]
    fn test_from_snapshot_fallback_timestamp() {
        let snapshot = MetricSnapshot::default();
        assert_eq!(CounterSample::from_snapshot(&snapshot, 42.0).timestamp, 42.0);

        let stamped = MetricSnapshot {
            timestamp: Some(7.0),
            ..Default::default()
        };
        assert_eq!(CounterSample::from_snapshot(&stamped, 42.0).timestamp, 7.0);
    }
}
