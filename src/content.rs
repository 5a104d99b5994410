//! Content parts exchanged at the adapter's boundaries
//!
//! A [`ContentPart`] is one unit of multimodal data: a MIME type, an optional
//! role tag, optional raw bytes or text, and free-form metadata.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form metadata attached to parts and messages
pub type Metadata = serde_json::Map<String, Value>;

/// MIME type of every part the adapter emits
pub const TEXT_PLAIN: &str = "text/plain";

/// Metadata key carrying the producing model's identifier
pub const MODEL_METADATA_KEY: &str = "model";

/// Role tag carried by a content part
///
/// Roles compare by name, so `Other("model")` equals `Model`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Model,
    System,
    /// Any role name the adapter does not treat specially
    Other(String),
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "user",
            Self::Model => "model",
            Self::System => "system",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        match value {
            "user" => Self::User,
            "model" => Self::Model,
            "system" => Self::System,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "user" | "model" | "system" => Self::from(value.as_str()),
            _ => Self::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl PartialEq for Role {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Role {}

impl Hash for Role {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad classification of a MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeKind {
    Text,
    Image,
    Other,
}

impl MimeKind {
    /// Classify a MIME type by its top-level type
    #[must_use]
    pub fn of(mimetype: &str) -> Self {
        let top = mimetype.split('/').next().unwrap_or_default();
        if top.eq_ignore_ascii_case("text") && mimetype.contains('/') {
            Self::Text
        } else if top.eq_ignore_ascii_case("image") && mimetype.contains('/') {
            Self::Image
        } else {
            Self::Other
        }
    }
}

/// Returns true for `text/*` MIME types
#[must_use]
pub fn is_text(mimetype: &str) -> bool {
    MimeKind::of(mimetype) == MimeKind::Text
}

/// Returns true for `image/*` MIME types
#[must_use]
pub fn is_image(mimetype: &str) -> bool {
    MimeKind::of(mimetype) == MimeKind::Image
}

/// A single unit of multimodal content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    pub mimetype: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Raw payload, base64-encoded on the wire
    #[serde(
        default,
        rename = "data",
        skip_serializing_if = "Option::is_none",
        with = "base64_bytes"
    )]
    pub bytes: Option<Bytes>,

    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl ContentPart {
    /// Create a `text/plain` part
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            mimetype: TEXT_PLAIN.to_string(),
            role: None,
            text: Some(text.into()),
            bytes: None,
            metadata: Metadata::new(),
        }
    }

    /// Create a part holding raw bytes of the given MIME type
    #[must_use]
    pub fn from_bytes(mimetype: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            mimetype: mimetype.into(),
            role: None,
            text: None,
            bytes: Some(bytes.into()),
            metadata: Metadata::new(),
        }
    }

    /// Create a `text/plain` part produced by a model
    #[must_use]
    pub fn model_output(text: impl Into<String>, model: &str) -> Self {
        let mut part = Self::text(text).with_role(Role::Model);
        part.metadata
            .insert(MODEL_METADATA_KEY.to_string(), Value::String(model.to_string()));
        part
    }

    #[must_use]
    pub fn with_role(mut self, role: impl Into<Role>) -> Self {
        self.role = Some(role.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> MimeKind {
        MimeKind::of(&self.mimetype)
    }

    /// Text content of the part
    ///
    /// Falls back to the raw bytes decoded as UTF-8 (lossy), then to "".
    #[must_use]
    pub fn text_content(&self) -> Cow<'_, str> {
        match (&self.text, &self.bytes) {
            (Some(text), _) => Cow::Borrowed(text.as_str()),
            (None, Some(bytes)) => String::from_utf8_lossy(bytes),
            (None, None) => Cow::Borrowed(""),
        }
    }

    /// Raw bytes, if present and non-empty
    #[must_use]
    pub fn payload(&self) -> Option<&[u8]> {
        self.bytes.as_deref().filter(|bytes| !bytes.is_empty())
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose, Engine as _};
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Option<Bytes>, serializer: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_str(&general_purpose::STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Bytes>, D::Error> {
        let encoded = Option::<String>::deserialize(deserializer)?;
        encoded
            .map(|s| {
                general_purpose::STANDARD
                    .decode(s.as_bytes())
                    .map(Bytes::from)
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
    }
}
