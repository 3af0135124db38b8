mod rate;
mod types;
mod window;

pub use rate::{counter_rate, CounterSample, ThroughputRates};
pub use types::{
    CpuStats, DiskIoCounters, DiskUsage, MemoryStats, MetricSnapshot, NetworkCounters,
};
pub use window::RollingWindow;
