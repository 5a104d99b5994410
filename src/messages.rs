//! Message types passed to chat models
//!
//! A turn's content parts are grouped into role-tagged messages. A message
//! holds either a bare string or an ordered list of typed content blocks.

use serde::{Deserialize, Serialize};

use crate::content::Metadata;

/// Message role as understood by chat models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    Human,
    Ai,
}

impl MessageRole {
    /// Prefix used when rendering a transcript
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::System => "System",
            Self::Human => "Human",
            Self::Ai => "AI",
        }
    }
}

/// Image reference carried by an `image_url` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Content block in a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentBlock {
    /// Build an `image_url` block from a data URI
    #[must_use]
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }

    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }
}

/// Message content: a bare string or a list of blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl MessageContent {
    /// Collapse a block list into a bare string when it is a single text block
    #[must_use]
    pub fn from_blocks(mut blocks: Vec<ContentBlock>) -> Self {
        if blocks.len() == 1 && blocks[0].is_text() {
            if let Some(ContentBlock::Text { text }) = blocks.pop() {
                return Self::Text(text);
            }
        }
        Self::Blocks(blocks)
    }
}

/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: MessageContent,
    /// Metadata of the last content part that contributed to this message
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl Message {
    /// Create a new system message
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(MessageRole::System, MessageContent::Text(text.into()))
    }

    /// Create a new human message
    #[must_use]
    pub fn human(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Human, MessageContent::Text(text.into()))
    }

    /// Create a new AI message
    #[must_use]
    pub fn ai(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Ai, MessageContent::Text(text.into()))
    }

    #[must_use]
    pub fn new(role: MessageRole, content: MessageContent) -> Self {
        Self {
            role,
            content,
            metadata: Metadata::new(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Get text content from the message (concatenates all text blocks)
    #[must_use]
    pub fn text_content(&self) -> String {
        match &self.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    ContentBlock::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Render messages as a plain transcript, one line per message
///
/// Images are shown as `[image]` placeholders.
#[must_use]
pub fn transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|message| {
            let body = match &message.content {
                MessageContent::Text(text) => text.clone(),
                MessageContent::Blocks(blocks) => blocks
                    .iter()
                    .map(|block| match block {
                        ContentBlock::Text { text } => text.as_str(),
                        ContentBlock::ImageUrl { .. } => "[image]",
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
            };
            format!("{}: {body}", message.role.label())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
