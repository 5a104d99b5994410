//! Server-Sent Events (SSE) parser
//!
//! Incremental: feed it text as it arrives and it returns the events that
//! became complete. Only the `data` field is kept; chat-completions streams
//! do not name their events.

/// SSE event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    /// Event data; multiple `data:` lines are joined with `\n`
    pub data: String,
}

impl SseEvent {
    /// Check if this is the `[DONE]` sentinel of chat-completions streams
    pub fn is_done_marker(&self) -> bool {
        self.data == "[DONE]"
    }
}

/// SSE parser for streaming responses
#[derive(Debug, Default)]
pub struct SseParser {
    current: SseEvent,
    has_data: bool,
    line_buffer: String,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a chunk of SSE text, returning completed events
    pub fn parse_chunk(&mut self, chunk: &str) -> Vec<SseEvent> {
        self.line_buffer.push_str(chunk);

        let mut events = Vec::new();
        while let Some(line_end) = self.line_buffer.find('\n') {
            let line: String = self.line_buffer.drain(..=line_end).collect();
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(event) = self.process_line(line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing event that was not followed by a blank line
    pub fn flush(&mut self) -> Option<SseEvent> {
        if !self.line_buffer.is_empty() {
            let line = std::mem::take(&mut self.line_buffer);
            if let Some(event) = self.process_line(line.trim_end_matches('\r')) {
                return Some(event);
            }
        }
        self.take_event()
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.take_event();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            if self.has_data {
                self.current.data.push('\n');
            }
            self.current.data.push_str(value);
            self.has_data = true;
        }
        None
    }

    fn take_event(&mut self) -> Option<SseEvent> {
        if !self.has_data {
            self.current = SseEvent::default();
            return None;
        }
        self.has_data = false;
        Some(std::mem::take(&mut self.current))
    }
}
