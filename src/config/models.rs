//! Model configuration and profiles

use serde::{Deserialize, Serialize};

use crate::error::{AdapterError, Result};

/// AI provider types
///
/// Every provider here speaks the OpenAI chat-completions protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[default]
    OpenAI,
    Ollama,
    Groq,
    Custom,
}

impl ProviderType {
    /// Get the default base URL for this provider
    #[must_use]
    pub const fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("https://api.openai.com/v1"),
            Self::Groq => Some("https://api.groq.com/openai/v1"),
            Self::Ollama => Some("http://localhost:11434/v1"),
            Self::Custom => None,
        }
    }

    /// Check if this provider requires an API key
    #[must_use]
    pub const fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Ollama)
    }

    /// Environment variable consulted when the profile has no key
    #[must_use]
    pub const fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI | Self::Custom => Some("OPENAI_API_KEY"),
            Self::Groq => Some("GROQ_API_KEY"),
            Self::Ollama => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Ollama => "ollama",
            Self::Groq => "groq",
            Self::Custom => "custom",
        }
    }
}

/// Model profile configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelProfile {
    /// Provider type
    pub provider: ProviderType,

    /// Model identifier sent to the provider
    pub model_name: String,

    /// Custom API endpoint (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// API key for authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum output tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for ModelProfile {
    fn default() -> Self {
        Self {
            provider: ProviderType::default(),
            model_name: "gpt-4o-mini".to_string(),
            base_url: None,
            api_key: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl ModelProfile {
    /// Create a profile with provider defaults
    #[must_use]
    pub fn new(provider: ProviderType, model_name: impl Into<String>) -> Self {
        Self {
            provider,
            model_name: model_name.into(),
            ..Self::default()
        }
    }

    /// Endpoint to call: the configured URL, else the provider default
    ///
    /// # Errors
    ///
    /// Returns an error for providers without a default endpoint when none is set.
    pub fn resolve_base_url(&self) -> Result<String> {
        self.base_url
            .as_deref()
            .or_else(|| self.provider.default_base_url())
            .map(|url| url.trim_end_matches('/').to_string())
            .ok_or_else(|| {
                AdapterError::ConfigValidation(format!(
                    "provider '{}' requires base_url",
                    self.provider.as_str()
                ))
            })
    }

    /// API key: the configured value, else the provider's environment variable
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::MissingApiKey`] when the provider needs a key
    /// and none is available.
    pub fn resolve_api_key(&self) -> Result<Option<String>> {
        if let Some(key) = self.api_key.as_deref().filter(|key| !key.is_empty()) {
            return Ok(Some(key.to_string()));
        }

        let from_env = self
            .provider
            .api_key_env()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty());

        match from_env {
            Some(key) => Ok(Some(key)),
            None if self.provider.requires_api_key() => Err(AdapterError::MissingApiKey {
                provider: self.provider.as_str().to_string(),
            }),
            None => Ok(None),
        }
    }

    /// Validate the profile
    ///
    /// # Errors
    ///
    /// Returns an error if the model name is empty or no endpoint can be resolved.
    pub fn validate(&self) -> Result<()> {
        if self.model_name.trim().is_empty() {
            return Err(AdapterError::ConfigValidation(
                "model_name must not be empty".to_string(),
            ));
        }
        self.resolve_base_url()?;
        Ok(())
    }
}
