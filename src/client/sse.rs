//! Incremental `text/event-stream` decoder.
//!
//! Bytes arrive in arbitrary chunks; [`SseDecoder::push`] buffers partial
//! lines and returns every event completed by the chunk. Line endings may be
//! CRLF, LF or CR, and a CRLF split across two chunks counts as one ending.

use std::time::Duration;

pub const DEFAULT_EVENT_TYPE: &str = "message";

const BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event_type: String,
    pub data: String,
    /// Last event id in effect when this event was dispatched
    pub id: String,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    line: Vec<u8>,
    data: String,
    event_type: String,
    last_event_id: String,
    retry: Option<Duration>,
    skipped_cr: bool,
    at_stream_start: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self {
            at_stream_start: true,
            ..Self::default()
        }
    }

    pub fn last_event_id(&self) -> &str {
        &self.last_event_id
    }

    /// Reconnection delay announced by the server, if any
    pub fn retry(&self) -> Option<Duration> {
        self.retry
    }

    /// Forget everything tied to the current connection.
    /// The last event id and retry delay survive.
    pub fn reset(&mut self) {
        self.line.clear();
        self.data.clear();
        self.event_type.clear();
        self.skipped_cr = false;
        self.at_stream_start = true;
    }

    pub fn push(&mut self, mut chunk: &[u8]) -> Vec<SseEvent> {
        let mut events = Vec::new();

        if self.at_stream_start {
            // Wait until we can tell whether the stream opens with a BOM
            self.line.extend_from_slice(chunk);
            if self.line.len() < BOM.len() && BOM.starts_with(&self.line) {
                return events;
            }
            self.at_stream_start = false;
            let buffered = std::mem::take(&mut self.line);
            let body = buffered.strip_prefix(BOM).unwrap_or(&buffered);
            self.feed(body, &mut events);
            return events;
        }

        if self.skipped_cr {
            self.skipped_cr = false;
            if chunk.first() == Some(&b'\n') {
                chunk = &chunk[1..];
            }
        }
        self.feed(chunk, &mut events);
        events
    }

    fn feed(&mut self, bytes: &[u8], events: &mut Vec<SseEvent>) {
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => self.end_line(events),
                b'\r' => {
                    self.end_line(events);
                    match bytes.get(i + 1) {
                        Some(b'\n') => i += 1,
                        Some(_) => {}
                        None => self.skipped_cr = true,
                    }
                }
                byte => self.line.push(byte),
            }
            i += 1;
        }
    }

    fn end_line(&mut self, events: &mut Vec<SseEvent>) {
        let raw = std::mem::take(&mut self.line);
        let line = String::from_utf8_lossy(&raw);

        if line.is_empty() {
            if let Some(event) = self.dispatch() {
                events.push(event);
            }
            return;
        }
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line.as_ref(), ""),
        };

        match field {
            "event" => self.event_type = value.to_string(),
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
            }
            "id" => {
                if !value.contains('\0') {
                    self.last_event_id = value.to_string();
                }
            }
            "retry" => {
                if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
                    if let Ok(ms) = value.parse::<u64>() {
                        self.retry = Some(Duration::from_millis(ms));
                    }
                }
            }
            _ => {}
        }
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event_type = std::mem::take(&mut self.event_type);
        if self.data.is_empty() {
            return None;
        }
        let mut data = std::mem::take(&mut self.data);
        if data.ends_with('\n') {
            data.pop();
        }
        Some(SseEvent {
            event_type: if event_type.is_empty() {
                DEFAULT_EVENT_TYPE.to_string()
            } else {
                event_type
            },
            data,
            id: self.last_event_id.clone(),
        })
    }
}
