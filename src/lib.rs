//! turn-adapter: streams chat-model output for multimodal conversation turns
//!
//! A [`TurnAdapter`] buffers one turn of [`ContentPart`]s (text and images),
//! groups them into role-tagged chat messages, optionally prepends a system
//! instruction or renders a prompt template, and relays the model's streamed
//! output as `text/plain` parts with role `model`.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::too_many_lines)]

pub mod adapter;
pub mod cli;
pub mod config;
pub mod content;
pub mod convert;
pub mod error;
pub mod messages;
pub mod services;
pub mod template;

// Re-exports for convenience
pub use adapter::{TurnAdapter, TurnAdapterBuilder, TurnFormatter};
pub use content::{ContentPart, Role};
pub use error::{AdapterError, Result};
pub use messages::{ContentBlock, Message, MessageContent, MessageRole};
pub use services::{ChatModel, Chunk, ChunkStream, ModelInput};
