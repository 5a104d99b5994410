//! CLI argument parsing and turn construction

use std::{
    fs,
    path::{Path, PathBuf},
};

use bytes::Bytes;
use clap::{Args, Parser, Subcommand};

use crate::{
    config::Config,
    content::{ContentPart, Role},
    error::Result,
};

/// turn-adapter: stream a chat model's reply to one multimodal turn
#[derive(Debug, Parser)]
#[command(name = "turn-adapter")]
#[command(about = "Stream a chat model's reply to one multimodal turn", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true, env = "TURN_ADAPTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Send a turn to the model and stream the reply to stdout
    Run {
        #[command(flatten)]
        turn: TurnArgs,

        /// Override the configured model name
        #[arg(long)]
        model: Option<String>,
    },

    /// Print the payload that would be sent to the model, without calling it
    Messages {
        #[command(flatten)]
        turn: TurnArgs,
    },

    /// Show version information
    Version,
}

/// Arguments describing one turn
#[derive(Debug, Clone, Args)]
pub struct TurnArgs {
    /// Turn inputs: text, or `@path` for an image file (`@@` escapes a literal `@`)
    pub inputs: Vec<String>,

    /// Role tag for positional inputs
    #[arg(long, default_value = "user")]
    pub role: String,

    /// JSONL file of content parts, appended after positional inputs
    #[arg(long)]
    pub parts: Option<PathBuf>,

    /// Override the configured system instruction
    #[arg(long)]
    pub system: Option<String>,

    /// Override the configured prompt template with a file's contents
    #[arg(long)]
    pub template_file: Option<PathBuf>,
}

impl TurnArgs {
    /// Build the turn's content parts
    ///
    /// # Errors
    ///
    /// Returns an error if an input file cannot be read or a JSONL line is not
    /// a valid content part
    pub fn to_parts(&self) -> Result<Vec<ContentPart>> {
        let role = Role::from(self.role.as_str());
        let mut parts = self
            .inputs
            .iter()
            .map(|input| parse_input(input, &role))
            .collect::<Result<Vec<_>>>()?;

        if let Some(path) = &self.parts {
            parts.extend(read_parts(path)?);
        }
        Ok(parts)
    }

    /// Apply prompt overrides to a loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the template file cannot be read
    pub fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(system) = &self.system {
            config.system_instruction = Some(system.clone());
        }
        if let Some(path) = &self.template_file {
            config.prompt_template = Some(fs::read_to_string(path)?);
        }
        Ok(())
    }
}

/// Turn one positional input into a content part
///
/// # Errors
///
/// Returns an error if an `@path` input cannot be read
pub fn parse_input(input: &str, role: &Role) -> Result<ContentPart> {
    let part = match input.strip_prefix('@') {
        Some(rest) if rest.starts_with('@') => ContentPart::text(rest),
        Some(path) => {
            let path = Path::new(path);
            ContentPart::from_bytes(mimetype_for_path(path), Bytes::from(fs::read(path)?))
        }
        None => ContentPart::text(input),
    };
    Ok(part.with_role(role.clone()))
}

/// Guess a MIME type from a file extension
#[must_use]
pub fn mimetype_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("txt" | "md") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Read content parts from a JSONL file, skipping blank lines
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line does not parse
pub fn read_parts(path: &Path) -> Result<Vec<ContentPart>> {
    fs::read_to_string(path)?
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| Ok(serde_json::from_str(line)?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from([
            "turn-adapter",
            "-v",
            "run",
            "--system",
            "Be terse.",
            "hello",
            "@cat.png",
            "--model",
            "gpt-4o",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Run { turn, model } = cli.command else {
            panic!("Expected run command");
        };
        assert_eq!(turn.inputs, vec!["hello", "@cat.png"]);
        assert_eq!(turn.role, "user");
        assert_eq!(turn.system.as_deref(), Some("Be terse."));
        assert_eq!(model.as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn test_parse_input_variants() {
        let role = Role::User;
        assert_eq!(parse_input("hi", &role).unwrap(), ContentPart::text("hi").with_role("user"));
        assert_eq!(
            parse_input("@@handle", &role).unwrap().text.as_deref(),
            Some("@handle")
        );

        let mut file = tempfile::Builder::new().suffix(".PNG").tempfile().unwrap();
        file.write_all(b"\x89PNG").unwrap();
        let part = parse_input(&format!("@{}", file.path().display()), &role).unwrap();
        assert_eq!(part.mimetype, "image/png");
        assert_eq!(part.payload(), Some(&b"\x89PNG"[..]));
    }

    #[test]
    fn test_mimetype_for_unknown_extension() {
        assert_eq!(mimetype_for_path(Path::new("blob.bin")), "application/octet-stream");
        assert_eq!(mimetype_for_path(Path::new("photo.JPEG")), "image/jpeg");
    }

    #[test]
    fn test_read_parts_jsonl() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"mimetype":"text/plain","role":"model","text":"earlier"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"mimetype":"text/plain","text":"later"}}"#).unwrap();

        let parts = read_parts(file.path()).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].role, Some(Role::Model));
        assert_eq!(parts[1].role, None);
    }

    #[test]
    fn test_apply_overrides() {
        let mut template = tempfile::NamedTempFile::new().unwrap();
        write!(template, "{{{{ messages | transcript }}}}").unwrap();

        let turn = TurnArgs {
            inputs: Vec::new(),
            role: "user".into(),
            parts: None,
            system: Some("Be terse.".into()),
            template_file: Some(template.path().to_path_buf()),
        };
        let mut config = Config::default();
        turn.apply(&mut config).unwrap();
        assert_eq!(config.system_instruction.as_deref(), Some("Be terse."));
        assert_eq!(
            config.prompt_template.as_deref(),
            Some("{{ messages | transcript }}")
        );
    }
}
