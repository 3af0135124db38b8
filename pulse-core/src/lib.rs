//! pulse-core - Live metrics feed and chart model
//!
//! Provides the pieces behind the pulse dashboard:
//! - Snapshot decoding for the metrics event stream
//! - Rate computation over cumulative counters
//! - Rolling chart windows, gauges and the disk-usage bar chart
//! - A server-sent events listener with reconnect backoff
//! - Configuration management
//!
//! ## Primary API
//!
//! Drive a [`Dashboard`] with a [`FeedListener`]; everything else is
//! exposed for callers that want to render or test the pieces separately.

// Public modules
pub mod config;
pub mod dashboard;
pub mod feed;
pub mod metrics;

// Public exports
pub use config::{Config, ConfigError, DashboardConfig, FeedConfig, ReconnectConfig, ThresholdConfig};
pub use dashboard::{
    BarChart, ChartUpdater, Clock, ConnectionStatus, Dashboard, Gauge, GaugeLevel, LineChart,
    StatusIndicator, SystemClock, UpdateOutcome,
};
pub use feed::{CancellationToken, FeedError, FeedHandler, FeedListener, SseDecoder, SseEvent};
pub use metrics::{CounterSample, MetricSnapshot, RollingWindow, ThroughputRates};
