//! HTTP subscription to the metrics event stream.
//!
//! Opens a long-lived GET against the server-sent events endpoint, decodes
//! each `message` event into a [`MetricSnapshot`], and reports
//! connectivity to a [`FeedHandler`]. When the stream fails or ends the
//! listener waits out a backoff delay and subscribes again.

use std::io;
use std::time::Duration;

use futures::{StreamExt, TryStreamExt};
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, Response};
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::backoff::ReconnectBackoff;
use super::sse::SseDecoder;
use super::{FeedError, FeedHandler, Result};
use crate::config::{FeedConfig, ReconnectConfig};
use crate::dashboard::ConnectionStatus;
use crate::metrics::MetricSnapshot;

const EVENT_STREAM: &str = "text/event-stream";
const LAST_EVENT_ID: &str = "Last-Event-ID";

enum StreamEnd {
    Closed,
    Cancelled,
}

/// Subscriber for the metrics event stream.
pub struct FeedListener {
    client: Client,
    url: String,
    reconnect: ReconnectConfig,
}

impl FeedListener {
    /// Create a listener with an HTTP client configured from `config`.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a listener with a custom HTTP client.
    pub fn with_client(client: Client, config: &FeedConfig) -> Self {
        Self {
            client,
            url: config.url.clone(),
            reconnect: config.reconnect,
        }
    }

    /// Get the stream URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Subscribe until `cancel` fires, reconnecting after every failure.
    ///
    /// Each event is handled to completion before the next one is read.
    /// Cancellation returns without a final status callback.
    pub async fn run<H: FeedHandler>(&self, handler: &mut H, cancel: CancellationToken) {
        let mut backoff = ReconnectBackoff::new(&self.reconnect);
        let mut last_event_id: Option<String> = None;

        loop {
            let connected = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = self.connect(last_event_id.as_deref()) => result,
            };

            match connected {
                Ok(response) => {
                    info!(url = %self.url, "Connected to metrics feed");
                    backoff.reset();
                    handler.on_status(ConnectionStatus::Connected);

                    let end = self
                        .consume(response, handler, &mut last_event_id, &mut backoff, &cancel)
                        .await;
                    match end {
                        Ok(StreamEnd::Cancelled) => break,
                        Ok(StreamEnd::Closed) => info!("Metrics feed closed by server"),
                        Err(e) => warn!(error = %e, "Metrics feed stream failed"),
                    }
                }
                Err(e) => warn!(url = %self.url, error = %e, "Failed to connect to metrics feed"),
            }

            handler.on_status(ConnectionStatus::Disconnected);

            let delay = backoff.next_delay();
            debug!(delay_ms = delay.as_millis() as u64, "Waiting before reconnecting");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        debug!("Metrics feed listener stopped");
    }

    async fn connect(&self, last_event_id: Option<&str>) -> Result<Response> {
        let mut request = self
            .client
            .get(&self.url)
            .header(ACCEPT, EVENT_STREAM)
            .header(CACHE_CONTROL, "no-cache");

        if let Some(id) = last_event_id {
            request = request.header(LAST_EVENT_ID, id);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.to_ascii_lowercase().starts_with(EVENT_STREAM) {
            return Err(FeedError::ContentType(content_type));
        }

        Ok(response)
    }

    async fn consume<H: FeedHandler>(
        &self,
        response: Response,
        handler: &mut H,
        last_event_id: &mut Option<String>,
        backoff: &mut ReconnectBackoff,
        cancel: &CancellationToken,
    ) -> Result<StreamEnd> {
        let body = Box::pin(response.bytes_stream().map_err(io::Error::other));
        let decoder = SseDecoder::new().with_last_event_id(last_event_id.clone());
        let mut frames = FramedRead::new(StreamReader::new(body), decoder);

        loop {
            let frame = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(StreamEnd::Cancelled),
                frame = frames.next() => frame,
            };

            let decoder = frames.decoder_mut();
            *last_event_id = decoder.last_event_id().map(str::to_string);
            if let Some(retry_ms) = decoder.take_retry() {
                debug!(retry_ms, "Server set reconnection time");
                backoff.set_initial(Duration::from_millis(retry_ms));
            }

            let event = match frame {
                Some(event) => event?,
                None => return Ok(StreamEnd::Closed),
            };

            if !event.is_message() {
                trace!(event = %event.event, "Ignoring non-message event");
                continue;
            }

            match MetricSnapshot::decode(&event.data) {
                Ok(snapshot) => {
                    handler.on_snapshot(snapshot);
                    handler.on_status(ConnectionStatus::Connected);
                }
                Err(e) => {
                    warn!(error = %e, "Dropping undecodable metrics event");
                    handler.on_status(ConnectionStatus::Disconnected);
                }
            }
        }
    }
}
