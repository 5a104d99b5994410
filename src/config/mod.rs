//! Configuration management for turn-adapter
//!
//! Configuration is read from the first TOML file found in:
//! 1. An explicit path (`--config`)
//! 2. Project config (`./turn-adapter.toml`)
//! 3. Global config (`<config dir>/turn-adapter/config.toml`)
//!
//! When no file exists the defaults are used.

pub mod models;

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

pub use self::models::{ModelProfile, ProviderType};
use crate::{
    adapter::{TurnAdapter, TurnFormatter},
    error::{AdapterError, Result},
    services,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Leading system message injected on every turn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,

    /// Jinja template the message list is rendered through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,

    /// Model the adapter streams from
    pub model: ModelProfile,
}

impl Config {
    /// Load configuration, honouring an explicit path first
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit path is missing, or if the file found
    /// cannot be read or parsed
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(AdapterError::ConfigParse {
                    path: path.to_path_buf(),
                    message: "file not found".to_string(),
                });
            }
            return Self::load_from_path(path);
        }

        for path in [Self::project_config_path(), Self::global_config_path()] {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config");
                return Self::load_from_path(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| AdapterError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        toml::from_str(&contents).map_err(|e| AdapterError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the configuration directory path
    #[must_use]
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("turn-adapter")
    }

    /// Get the global config file path
    #[must_use]
    pub fn global_config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Get the project config file path in the current directory
    #[must_use]
    pub fn project_config_path() -> PathBuf {
        PathBuf::from("turn-adapter.toml")
    }

    /// Build the formatter described by this configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt template does not compile
    pub fn formatter(&self) -> Result<TurnFormatter> {
        let mut formatter = TurnFormatter::new();
        if let Some(instruction) = &self.system_instruction {
            formatter = formatter.system_instruction(instruction.clone());
        }
        if let Some(template) = &self.prompt_template {
            formatter = formatter.prompt_template(template.clone())?;
        }
        Ok(formatter)
    }

    /// Build an adapter backed by the configured model
    ///
    /// # Errors
    ///
    /// Returns an error if the model profile is invalid or the template does
    /// not compile
    pub fn build_adapter(&self) -> Result<TurnAdapter> {
        self.model.validate()?;
        let llm = services::create_model(&self.model)?;
        Ok(TurnAdapter::from_parts(llm, self.formatter()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_paths() {
        let global_path = Config::global_config_path();
        assert!(global_path.ends_with("turn-adapter/config.toml"));

        let project_path = Config::project_config_path();
        assert_eq!(project_path, PathBuf::from("turn-adapter.toml"));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
system_instruction = "Be terse."
prompt_template = "{{{{ messages | transcript }}}}"

[model]
provider = "custom"
model_name = "local-llava"
base_url = "http://localhost:8080/v1"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.system_instruction.as_deref(), Some("Be terse."));
        assert_eq!(
            config.prompt_template.as_deref(),
            Some("{{ messages | transcript }}")
        );
        assert_eq!(config.model.provider, ProviderType::Custom);
        assert_eq!(config.model.model_name, "local-llava");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/turn-adapter.toml"))).unwrap_err();
        assert!(matches!(err, AdapterError::ConfigParse { .. }));
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "model = 3").unwrap();
        assert!(matches!(
            Config::load_from_path(file.path()).unwrap_err(),
            AdapterError::ConfigParse { .. }
        ));
    }

    #[test]
    fn test_formatter_rejects_bad_template() {
        let config = Config {
            prompt_template: Some("{% if %}".into()),
            ..Config::default()
        };
        assert!(matches!(
            config.formatter().unwrap_err(),
            AdapterError::Template(_)
        ));
    }
}
