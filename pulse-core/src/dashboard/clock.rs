use chrono::{Local, Utc};

/// Source of wall-clock time for the chart updater.
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now_seconds(&self) -> f64;

    /// Local time of day used to label chart points.
    fn time_label(&self) -> String;
}

/// Clock backed by the host's system time and local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_seconds(&self) -> f64 {
        Utc::now().timestamp_millis() as f64 / 1000.0
    }

    fn time_label(&self) -> String {
        Local::now().format("%H:%M:%S").to_string()
    }
}
