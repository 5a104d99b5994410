//! OpenAI API streaming decoder
//!
//! Feeds raw response bytes through the SSE parser and yields the text
//! deltas in arrival order.

use crate::error::{AdapterError, Result};

use super::{OpenAIStreamChunk, SseEvent, SseParser, StreamErrorEnvelope};

/// Output of one decoding step
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Non-empty text deltas, in order
    pub deltas: Vec<String>,
    /// The `[DONE]` marker was seen
    pub done: bool,
}

/// Decoder for OpenAI streaming responses
#[derive(Debug)]
pub struct OpenAIStreamDecoder {
    provider: String,
    parser: SseParser,
    /// Trailing bytes of an incomplete UTF-8 sequence
    pending: Vec<u8>,
    model: Option<String>,
    finish_reason: Option<String>,
}

impl OpenAIStreamDecoder {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            parser: SseParser::new(),
            pending: Vec::new(),
            model: None,
            finish_reason: None,
        }
    }

    /// Decode a chunk of bytes from the response body
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Stream`] for invalid UTF-8 or JSON and
    /// [`AdapterError::Api`] for error events sent by the server.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<Decoded> {
        self.pending.extend_from_slice(bytes);

        let valid_up_to = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                return Err(AdapterError::Stream(format!(
                    "Invalid UTF-8 in stream: {e}"
                )))
            }
        };

        let rest = self.pending.split_off(valid_up_to);
        let text = String::from_utf8(std::mem::replace(&mut self.pending, rest))
            .map_err(|e| AdapterError::Stream(e.to_string()))?;
        let events = self.parser.parse_chunk(&text);
        self.process_events(events)
    }

    /// Decode whatever is left once the body has ended
    ///
    /// # Errors
    ///
    /// Same as [`Self::push_bytes`]; also fails on a truncated UTF-8 sequence.
    pub fn finish(&mut self) -> Result<Decoded> {
        if !self.pending.is_empty() {
            return Err(AdapterError::Stream(
                "stream ended inside a UTF-8 sequence".to_string(),
            ));
        }
        let events = self.parser.flush().into_iter().collect();
        self.process_events(events)
    }

    /// Model name reported by the server, once seen
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.finish_reason.as_deref()
    }

    fn process_events(&mut self, events: Vec<SseEvent>) -> Result<Decoded> {
        let mut decoded = Decoded::default();
        for event in events {
            if event.is_done_marker() {
                decoded.done = true;
                break;
            }
            if let Some(delta) = self.process_event(&event)? {
                decoded.deltas.push(delta);
            }
        }
        Ok(decoded)
    }

    fn process_event(&mut self, event: &SseEvent) -> Result<Option<String>> {
        if let Ok(envelope) = serde_json::from_str::<StreamErrorEnvelope>(&event.data) {
            let message = match envelope.error.error_type {
                Some(kind) => format!("{kind}: {}", envelope.error.message),
                None => envelope.error.message,
            };
            return Err(AdapterError::Api {
                provider: self.provider.clone(),
                message,
            });
        }

        let chunk: OpenAIStreamChunk = serde_json::from_str(&event.data)
            .map_err(|e| AdapterError::Stream(format!("Failed to parse SSE event: {e}")))?;

        if self.model.is_none() {
            self.model = chunk.model;
        }

        let Some(choice) = chunk.choices.into_iter().next() else {
            return Ok(None);
        };
        if let Some(reason) = choice.finish_reason {
            self.finish_reason = Some(reason);
        }
        Ok(choice.delta.content.filter(|content| !content.is_empty()))
    }
}
