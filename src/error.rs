//! Error types for turn-adapter

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`AdapterError`]
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Main error type for turn-adapter
#[derive(Debug, Error)]
pub enum AdapterError {
    /// A content part is neither text nor an image with usable bytes
    #[error("Unsupported mimetype: {mimetype}")]
    UnsupportedMimetype { mimetype: String },

    /// Prompt template failed to compile or render
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Provider returned an error response
    #[error("API error ({provider}): {message}")]
    Api { provider: String, message: String },

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed streaming response
    #[error("Stream error: {0}")]
    Stream(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration parse error
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Configuration validation error
    #[error("Invalid configuration: {0}")]
    ConfigValidation(String),

    /// No API key configured or found in the environment
    #[error("Missing API key for provider: {provider}")]
    MissingApiKey { provider: String },
}

impl AdapterError {
    /// Create an unsupported-mimetype error
    pub fn unsupported(mimetype: impl Into<String>) -> Self {
        Self::UnsupportedMimetype {
            mimetype: mimetype.into(),
        }
    }

    /// True for errors caused by the turn's own content rather than the model
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::UnsupportedMimetype { .. })
    }
}
