use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::feed::FeedError;

/// One point-in-time reading pushed by the metrics server.
///
/// Every numeric field coalesces to 0 when it is missing, `null` or not a
/// number, and every nested object falls back to its all-zero default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// Seconds; the receiver substitutes wall-clock time when absent
    #[serde(default, deserialize_with = "timestamp")]
    pub timestamp: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub cpu: CpuStats,
    #[serde(default, deserialize_with = "lenient")]
    pub memory: MemoryStats,
    #[serde(default, deserialize_with = "lenient")]
    pub network: NetworkCounters,
    #[serde(default, deserialize_with = "lenient")]
    pub disk_io: DiskIoCounters,
    #[serde(default, deserialize_with = "disk_list")]
    pub disks: Vec<DiskUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuStats {
    #[serde(default, deserialize_with = "number")]
    pub utilisation: f64,
    #[serde(default, deserialize_with = "counter")]
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    #[serde(default, deserialize_with = "number")]
    pub utilisation: f64,
    #[serde(default, deserialize_with = "counter")]
    pub total_bytes: u64,
}

/// Cumulative network byte counters since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkCounters {
    #[serde(default, deserialize_with = "counter")]
    pub bytes_sent: u64,
    #[serde(default, deserialize_with = "counter")]
    pub bytes_recv: u64,
}

/// Cumulative disk I/O byte counters since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskIoCounters {
    #[serde(default, deserialize_with = "counter")]
    pub read_bytes: u64,
    #[serde(default, deserialize_with = "counter")]
    pub write_bytes: u64,
}

/// Usage of a single mounted filesystem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskUsage {
    #[serde(default, deserialize_with = "lenient")]
    pub mountpoint: String,
    #[serde(default, deserialize_with = "number")]
    pub utilisation: f64,
    #[serde(default, deserialize_with = "counter")]
    pub total_bytes: u64,
}

impl MetricSnapshot {
    /// Decode one event payload.
    ///
    /// The metrics server answers collection failures with an
    /// `{"error": "..."}` envelope; that is reported as [`FeedError::Producer`]
    /// rather than rendered as an all-zero snapshot. Anything that is not a
    /// JSON object is a [`FeedError::Decode`].
    pub fn decode(payload: &str) -> Result<Self, FeedError> {
        let value: Value = serde_json::from_str(payload)?;
        if !value.is_object() {
            return Err(FeedError::Decode(serde_json::Error::custom(
                "metrics payload is not a JSON object",
            )));
        }

        if let Some(message) = value.get("error").and_then(Value::as_str) {
            return Err(FeedError::Producer(message.to_string()));
        }

        Ok(serde_json::from_value(value)?)
    }
}

// Nested values of the wrong shape read as their default.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

fn disk_list<'de, D>(deserializer: D) -> Result<Vec<DiskUsage>, D::Error>
where
    D: Deserializer<'de>,
{
    let disks = match Value::deserialize(deserializer)? {
        Value::Array(entries) => entries
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|entry| DiskUsage::deserialize(entry).ok())
            .collect(),
        _ => Vec::new(),
    };
    Ok(disks)
}

fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_f64().unwrap_or(0.0))
}

fn timestamp<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_f64())
}

// The server reports counters through float gauges, so accept any JSON number.
fn counter<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number(deserializer)?.max(0.0) as u64)
}
