//! Dashboard state driven by the metrics feed.
//!
//! The dashboard is organized into separate concerns:
//! - `widgets`: Gauge, line chart and bar chart models
//! - `updater`: Snapshot-to-widget transformation and rate history
//! - `status`: Connection status indicator
//! - `clock`: Wall-clock source for timestamps and labels

mod clock;
mod status;
mod updater;
mod widgets;

pub use clock::{Clock, SystemClock};
pub use status::{ConnectionStatus, StatusIndicator};
pub use updater::{ChartUpdater, UpdateOutcome};
pub use widgets::{BarChart, Dataset, Gauge, GaugeLevel, LineChart, TRACK_COLOR};

use crate::config::DashboardConfig;
use crate::feed::FeedHandler;
use crate::metrics::MetricSnapshot;

/// Everything the page shows: charts, status and title.
pub struct Dashboard {
    title: String,
    charts: ChartUpdater,
    status: StatusIndicator,
}

impl Dashboard {
    pub fn new(config: &DashboardConfig) -> Self {
        Self::with_updater(config, ChartUpdater::new(config))
    }

    pub fn with_updater(config: &DashboardConfig, charts: ChartUpdater) -> Self {
        Self {
            title: config.title.clone(),
            charts,
            status: StatusIndicator::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn charts(&self) -> &ChartUpdater {
        &self.charts
    }

    pub fn status(&self) -> &StatusIndicator {
        &self.status
    }
}

impl FeedHandler for Dashboard {
    fn on_snapshot(&mut self, snapshot: MetricSnapshot) {
        self.charts.apply(&snapshot);
    }

    fn on_status(&mut self, status: ConnectionStatus) {
        self.status.set(status);
    }
}
