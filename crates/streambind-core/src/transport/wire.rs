//! text/event-stream wire decoder
//!
//! Incremental parser for the server-sent-events record format: `event:` and
//! `data:` lines, records terminated by a blank line. Handles chunks that
//! split records or lines at arbitrary byte boundaries.

use bytes::{Bytes, BytesMut};
use tracing::debug;

/// Default event name for records that carry no `event:` field
pub const MESSAGE_EVENT: &str = "message";

/// One decoded stream event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireEvent {
    pub event: String,
    pub data: String,
}

/// Incremental decoder that buffers partial lines and records across chunks
#[derive(Default)]
pub struct SseDecoder {
    /// Accumulated partial line bytes from previous chunks. Kept as bytes:
    /// a chunk boundary can fall inside a multi-byte UTF-8 sequence, so only
    /// complete lines are ever decoded.
    partial_line: BytesMut,
    /// `event:` field of the record being assembled
    event: Option<String>,
    /// `data:` lines of the record being assembled
    data_lines: Vec<String>,
    /// Bytes received counter
    bytes_received: usize,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of bytes, returning every event completed by it.
    pub fn push_chunk(&mut self, bytes: &Bytes) -> Vec<WireEvent> {
        self.bytes_received += bytes.len();
        self.partial_line.extend_from_slice(bytes);
        debug!(
            "SSE chunk received: {} bytes (total: {} bytes)",
            bytes.len(),
            self.bytes_received
        );

        let mut events = Vec::new();
        while let Some(idx) = self.partial_line.iter().position(|&b| b == b'\n') {
            let line_bytes = self.partial_line.split_to(idx + 1);
            let line = &line_bytes[..idx];
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if let Some(event) = self.push_line(&String::from_utf8_lossy(line)) {
                events.push(event);
            }
        }

        events
    }

    /// Process one complete line; a blank line may complete a record.
    fn push_line(&mut self, line: &str) -> Option<WireEvent> {
        if line.is_empty() {
            return self.dispatch();
        }

        // Comment line
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            // A line with no colon is a field with an empty value
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data_lines.push(value.to_string()),
            // `id` and `retry` are transport bookkeeping we don't surface
            _ => {}
        }

        None
    }

    /// Complete the record being assembled, if it carries any data.
    fn dispatch(&mut self) -> Option<WireEvent> {
        let event = self.event.take().unwrap_or_else(|| MESSAGE_EVENT.to_string());
        if self.data_lines.is_empty() {
            return None;
        }
        let data = self.data_lines.join("\n");
        self.data_lines.clear();
        debug!("SSE event decoded: {} ({} chars)", event, data.len());
        Some(WireEvent { event, data })
    }
}
