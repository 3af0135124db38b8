//! Subscription to the metrics event stream.
//!
//! - `sse`: Server-sent events framing on top of a line codec
//! - `backoff`: Reconnect delay schedule
//! - `listener`: HTTP subscription loop feeding a [`FeedHandler`]

mod backoff;
mod listener;
mod sse;

pub use backoff::ReconnectBackoff;
pub use listener::FeedListener;
pub use sse::{SseDecoder, SseEvent};
pub use tokio_util::sync::CancellationToken;

use crate::dashboard::ConnectionStatus;
use crate::metrics::MetricSnapshot;
use thiserror::Error;
use tokio_util::codec::LinesCodecError;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Feed responded with HTTP status {0}")]
    Status(u16),

    #[error("Feed is not an event stream (content type {0:?})")]
    ContentType(String),

    #[error("Failed to read event stream: {0}")]
    Stream(#[from] LinesCodecError),

    #[error("Failed to decode snapshot: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Metrics server reported an error: {0}")]
    Producer(String),
}

pub type Result<T> = std::result::Result<T, FeedError>;

/// Receives everything the listener learns from the stream.
///
/// Calls are strictly sequential: each event is fully handled before the
/// next one is read.
pub trait FeedHandler {
    /// A snapshot decoded successfully.
    fn on_snapshot(&mut self, snapshot: MetricSnapshot);

    /// The stream connected, delivered a good snapshot, failed, or
    /// delivered something undecodable.
    fn on_status(&mut self, status: ConnectionStatus);
}
