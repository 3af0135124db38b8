//! Server-sent events framing.
//!
//! Lines are split by [`LinesCodec`]; this layer assembles them into
//! events. Blank lines dispatch, `:` lines are comments, and multiple
//! `data:` lines are joined with `\n`.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};

/// Longest single line accepted from the stream.
const MAX_LINE_LENGTH: usize = 1024 * 1024;

const DEFAULT_EVENT_TYPE: &str = "message";

/// One dispatched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Event type; `message` unless the server named one
    pub event: String,
    pub data: String,
    /// Last event ID in effect when this event was dispatched
    pub id: Option<String>,
}

impl SseEvent {
    pub fn is_message(&self) -> bool {
        self.event == DEFAULT_EVENT_TYPE
    }
}

/// [`Decoder`] yielding [`SseEvent`]s from a raw event stream.
#[derive(Debug)]
pub struct SseDecoder {
    lines: LinesCodec,
    event: Option<String>,
    data: String,
    pending_id: Option<String>,
    last_event_id: String,
    retry: Option<u64>,
    at_start: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
            event: None,
            data: String::new(),
            pending_id: None,
            last_event_id: String::new(),
            retry: None,
            at_start: true,
        }
    }

    /// Start from the last event ID of a previous connection.
    pub fn with_last_event_id(mut self, id: Option<String>) -> Self {
        self.last_event_id = id.unwrap_or_default();
        self
    }

    /// Last event ID seen on the stream, `None` once cleared by an empty `id:`.
    pub fn last_event_id(&self) -> Option<&str> {
        (!self.last_event_id.is_empty()).then_some(self.last_event_id.as_str())
    }

    /// Most recent `retry:` value in milliseconds, cleared once taken.
    pub fn take_retry(&mut self) -> Option<u64> {
        self.retry.take()
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        let line = if self.at_start {
            self.at_start = false;
            line.strip_prefix('\u{feff}').unwrap_or(line)
        } else {
            line
        };

        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
            }
            "id" if !value.contains('\0') => self.pending_id = Some(value.to_string()),
            "retry" if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) => {
                self.retry = value.parse().ok();
            }
            _ => {}
        }
        None
    }

    // The block's id applies even when there is no data to dispatch.
    fn dispatch(&mut self) -> Option<SseEvent> {
        if let Some(id) = self.pending_id.take() {
            self.last_event_id = id;
        }
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }

        let mut data = std::mem::take(&mut self.data);
        data.pop();

        Some(SseEvent {
            event: event
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_string()),
            data,
            id: self.last_event_id().map(str::to_string),
        })
    }
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for SseDecoder {
    type Item = SseEvent;
    type Error = LinesCodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<SseEvent>, LinesCodecError> {
        while let Some(line) = self.lines.decode(src)? {
            if let Some(event) = self.process_line(&line) {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }

    // An event still being assembled when the stream ends is discarded.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<SseEvent>, LinesCodecError> {
        while let Some(line) = self.lines.decode_eof(src)? {
            if let Some(event) = self.process_line(&line) {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }
}
