use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

const DEFAULT_CONFIG_FILE: &str = "pulse.yaml";
const FEED_URL_ENV: &str = "PULSE_FEED_URL";
const TITLE_ENV: &str = "DASHBOARD_TITLE";

/// Configuration for the whole dashboard client.
///
/// Covers where the metrics stream lives and how the charts are shaped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Configuration for the event-stream subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Server-sent events endpoint publishing metric snapshots
    #[serde(default = "default_feed_url")]
    pub url: String,
    /// Timeout for establishing the HTTP connection
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

fn default_feed_url() -> String {
    "http://localhost:8000/api/stream".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            connect_timeout_ms: default_connect_timeout_ms(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// Reconnect backoff after the stream drops.
///
/// The delay doubles after every failed attempt, starting at `initial_delay_ms`
/// and never exceeding `max_delay_ms`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Configuration for the charts themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// Number of rate samples kept per line chart
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
}

fn default_title() -> String {
    "Machine Metrics Dashboard".to_string()
}

fn default_window_size() -> usize {
    60
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            window_size: default_window_size(),
            thresholds: ThresholdConfig::default(),
        }
    }
}

/// Gauge color tiers, in percent.
///
/// A value strictly above `critical` is critical, strictly above `warning`
/// is a warning, anything else is nominal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_warning")]
    pub warning: f64,
    #[serde(default = "default_critical")]
    pub critical: f64,
}

fn default_warning() -> f64 {
    70.0
}

fn default_critical() -> f64 {
    90.0
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            warning: default_warning(),
            critical: default_critical(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from `pulse.yaml` if it exists, otherwise use defaults.
    pub fn load_or_default() -> Result<Self> {
        Self::load_or_default_from(DEFAULT_CONFIG_FILE)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    ///
    /// A file that exists but cannot be read, parsed or validated is still
    /// an error.
    pub fn load_or_default_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match Self::load(path) {
            Err(ConfigError::FileRead(e)) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Create a new Config with default values and builder-style configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `PULSE_FEED_URL` and `DASHBOARD_TITLE` when they are set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(FEED_URL_ENV) {
            if !url.trim().is_empty() {
                self.feed.url = url;
            }
        }
        if let Ok(title) = std::env::var(TITLE_ENV) {
            if !title.trim().is_empty() {
                self.dashboard.title = title;
            }
        }
        self
    }

    /// Set the event-stream URL.
    pub fn with_feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed.url = url.into();
        self
    }

    /// Set the dashboard title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.dashboard.title = title.into();
        self
    }

    /// Set how many rate samples each line chart keeps.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.dashboard.window_size = window_size;
        self
    }

    /// Configure gauge color tiers.
    pub fn with_thresholds(mut self, thresholds: ThresholdConfig) -> Self {
        self.dashboard.thresholds = thresholds;
        self
    }

    /// Reject settings the dashboard cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.feed.url.trim().is_empty() {
            return Err(ConfigError::Invalid("feed.url must not be empty".to_string()));
        }
        if self.dashboard.window_size == 0 {
            return Err(ConfigError::Invalid(
                "dashboard.window_size must be at least 1".to_string(),
            ));
        }
        let thresholds = self.dashboard.thresholds;
        if thresholds.warning > thresholds.critical {
            return Err(ConfigError::Invalid(format!(
                "warning threshold {} is above critical threshold {}",
                thresholds.warning, thresholds.critical
            )));
        }
        Ok(())
    }
}
