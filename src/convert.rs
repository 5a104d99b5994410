//! Conversion of a buffered turn into chat messages
//!
//! Each part becomes one content block. Consecutive parts with the same role
//! tag are coalesced into a single message; a role change flushes the
//! pending blocks. An absent role is a distinct value of its own.

use base64::{engine::general_purpose, Engine as _};

use crate::{
    content::{ContentPart, MimeKind, Role},
    error::{AdapterError, Result},
    messages::{ContentBlock, Message, MessageContent, MessageRole},
};

/// Convert one content part into a content block
///
/// # Errors
///
/// Returns [`AdapterError::UnsupportedMimetype`] for parts that are neither
/// text nor an image with non-empty bytes.
pub fn content_block(part: &ContentPart) -> Result<ContentBlock> {
    match part.kind() {
        MimeKind::Text => Ok(ContentBlock::Text {
            text: part.text_content().into_owned(),
        }),
        MimeKind::Image => part
            .payload()
            .map(|bytes| ContentBlock::image_url(data_uri(&part.mimetype, bytes)))
            .ok_or_else(|| AdapterError::unsupported(&part.mimetype)),
        MimeKind::Other => Err(AdapterError::unsupported(&part.mimetype)),
    }
}

/// Build a `data:` URI with a base64 payload
#[must_use]
pub fn data_uri(mimetype: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mimetype};base64,{}",
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Message class for a part's role tag
#[must_use]
pub fn message_role(role: Option<&Role>) -> MessageRole {
    match role.map(Role::as_str) {
        Some("system") => MessageRole::System,
        Some("model") => MessageRole::Ai,
        _ => MessageRole::Human,
    }
}

/// Group a turn's parts into role-tagged messages
///
/// # Errors
///
/// Fails on the first unsupported part; no messages are returned in that case.
pub fn to_messages(parts: &[ContentPart]) -> Result<Vec<Message>> {
    let mut messages = Vec::new();
    let mut run = RoleRun::default();

    for part in parts {
        let block = content_block(part)?;
        if run.crosses_boundary(part) {
            messages.extend(run.flush());
        }
        run.push(part, block);
    }
    messages.extend(run.flush());

    Ok(messages)
}

/// Pending blocks of the current same-role run
#[derive(Default)]
struct RoleRun<'a> {
    blocks: Vec<ContentBlock>,
    last: Option<&'a ContentPart>,
}

impl<'a> RoleRun<'a> {
    fn crosses_boundary(&self, part: &ContentPart) -> bool {
        self.last.is_some_and(|last| last.role != part.role)
    }

    fn push(&mut self, part: &'a ContentPart, block: ContentBlock) {
        self.blocks.push(block);
        self.last = Some(part);
    }

    fn flush(&mut self) -> Option<Message> {
        let last = self.last.take()?;
        let blocks = std::mem::take(&mut self.blocks);
        Some(
            Message::new(
                message_role(last.role.as_ref()),
                MessageContent::from_blocks(blocks),
            )
            .with_metadata(last.metadata.clone()),
        )
    }
}
