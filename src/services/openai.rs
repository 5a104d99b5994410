//! OpenAI API chat model
//!
//! Supports:
//! - OpenAI official API
//! - OpenAI-compatible endpoints (Ollama, Groq, LM Studio, vLLM, etc.)

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use reqwest::{header, Client};
use serde::Serialize;

use crate::{
    config::models::ModelProfile,
    error::{AdapterError, Result},
    messages::{Message, MessageContent, MessageRole},
};

use super::{streaming::OpenAIStreamDecoder, ChatModel, Chunk, ChunkStream, ModelInput};

/// Streaming chat model for OpenAI-compatible endpoints
pub struct OpenAIChatModel {
    client: Client,
    profile: ModelProfile,
    base_url: String,
}

impl OpenAIChatModel {
    /// Create a new OpenAI chat model
    ///
    /// # Errors
    ///
    /// Returns an error if no endpoint or API key can be resolved, or the
    /// HTTP client cannot be built
    pub fn new(profile: ModelProfile) -> Result<Self> {
        let base_url = profile.resolve_base_url()?;
        let api_key = profile.resolve_api_key()?;

        let mut headers = header::HeaderMap::new();
        if let Some(api_key) = api_key {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
                    AdapterError::ConfigValidation("Invalid API key format".to_string())
                })?,
            );
        }

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            profile,
            base_url,
        })
    }

    #[must_use]
    pub fn profile(&self) -> &ModelProfile {
        &self.profile
    }

    fn provider(&self) -> &'static str {
        self.profile.provider.as_str()
    }

    /// Convert a model input to chat-completions messages
    fn convert_input(input: ModelInput) -> Vec<OpenAIMessage> {
        match input {
            ModelInput::Messages(messages) => messages.into_iter().map(OpenAIMessage::from).collect(),
            ModelInput::Prompt { input } => vec![OpenAIMessage {
                role: "user",
                content: MessageContent::Text(input),
            }],
        }
    }

    fn decode_stream(
        provider: &'static str,
        byte_stream: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
    ) -> impl Stream<Item = Result<Chunk>> + Send + 'static {
        async_stream::try_stream! {
            let mut decoder = OpenAIStreamDecoder::new(provider);
            let mut byte_stream = Box::pin(byte_stream);
            let mut done = false;

            while let Some(bytes) = byte_stream.next().await {
                let decoded = decoder.push_bytes(&bytes?)?;
                for delta in decoded.deltas {
                    yield Chunk::new(delta);
                }
                if decoded.done {
                    done = true;
                    break;
                }
            }

            if !done {
                for delta in decoder.finish()?.deltas {
                    yield Chunk::new(delta);
                }
            }
            tracing::debug!(
                provider,
                server_model = decoder.model().unwrap_or("unknown"),
                finish_reason = decoder.finish_reason().unwrap_or("unknown"),
                "stream finished"
            );
        }
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    fn model(&self) -> Option<&str> {
        Some(&self.profile.model_name)
    }

    async fn stream(&self, input: ModelInput) -> Result<ChunkStream> {
        let request = OpenAIRequest {
            model: &self.profile.model_name,
            messages: Self::convert_input(input),
            temperature: self.profile.temperature,
            max_tokens: self.profile.max_tokens,
            stream: true,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::warn!(provider = self.provider(), %status, "completion request failed");
            return Err(AdapterError::Api {
                provider: self.provider().to_string(),
                message: format!("HTTP {status}: {error_text}"),
            });
        }

        let stream = Self::decode_stream(self.provider(), response.bytes_stream());
        Ok(Box::pin(stream))
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

/// Chat message; block lists already match the content-part array format
#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: MessageContent,
}

impl From<Message> for OpenAIMessage {
    fn from(message: Message) -> Self {
        let role = match message.role {
            MessageRole::System => "system",
            MessageRole::Human => "user",
            MessageRole::Ai => "assistant",
        };
        Self {
            role,
            content: message.content,
        }
    }
}
