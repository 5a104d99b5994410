//! Chat model boundary
//!
//! The adapter talks to models only through [`ChatModel`]. This module also
//! provides an OpenAI-compatible implementation and a factory that builds
//! one from a [`ModelProfile`].

pub mod openai;
pub mod streaming;

use std::{pin::Pin, sync::Arc};

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::{config::models::ModelProfile, error::Result, messages::Message};

/// Payload handed to a model's streaming entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelInput {
    /// The turn's message list
    Messages(Vec<Message>),
    /// A rendered prompt template
    Prompt { input: String },
}

/// One incremental unit of streamed model output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
}

impl Chunk {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Chunk stream type
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Chunk>> + Send>>;

/// A chat model capable of streaming inference
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Declared model name, if the implementation carries one
    fn model(&self) -> Option<&str> {
        None
    }

    /// Label used when no model name is declared
    fn type_name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Start a streaming completion
    async fn stream(&self, input: ModelInput) -> Result<ChunkStream>;
}

/// Identifier reported in output metadata: the declared name, else the type name
#[must_use]
pub fn model_identifier(model: &dyn ChatModel) -> String {
    match model.model() {
        Some(name) => name.to_string(),
        None => model.type_name().to_string(),
    }
}

/// `crate::a::Foo<crate::b::Bar>` -> `Foo`
fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Create a chat model from a model profile
///
/// # Errors
///
/// Returns an error if the profile is incomplete (missing key or endpoint).
pub fn create_model(profile: &ModelProfile) -> Result<Arc<dyn ChatModel>> {
    Ok(Arc::new(openai::OpenAIChatModel::new(profile.clone())?))
}
