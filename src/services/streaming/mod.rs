//! Streaming support for chat-completions responses
//!
//! Turns the Server-Sent Events body of an OpenAI-compatible streaming
//! response into text deltas.

pub mod openai_stream;
pub mod sse_parser;

pub use openai_stream::OpenAIStreamDecoder;
pub use sse_parser::{SseEvent, SseParser};

use serde::Deserialize;

/// OpenAI stream event (chunk)
///
/// Compatible servers omit various fields, so everything but `choices` is
/// optional.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIStreamChunk {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<OpenAIChoice>,
}

/// OpenAI choice in stream
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIChoice {
    #[serde(default)]
    pub delta: OpenAIDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// OpenAI delta content
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAIDelta {
    #[serde(default)]
    pub content: Option<String>,
}

/// Error payload some servers send inside the event stream
#[derive(Debug, Clone, Deserialize)]
pub struct StreamErrorEnvelope {
    pub error: StreamErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}
