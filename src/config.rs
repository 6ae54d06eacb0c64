use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::utils::Result;

/// Language of the emitted recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Rust,
    C,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Rust => write!(f, "rust"),
            Target::C => write!(f, "c"),
        }
    }
}

/// How the matcher treats the escape marker inside a right-hand side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EscapeMode {
    /// The symbol after the marker is always matched as a literal terminal
    #[default]
    Literal,
    /// The marker is dropped and the next symbol is classified as usual,
    /// so an escaped uppercase letter still calls its rule
    Skip,
}

/// Configuration options for generation and in-process recognition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Language of the emitted program
    pub target: Target,
    /// Escape marker semantics shared by the emitter and the recognizer
    pub escape_mode: EscapeMode,
    /// Limit on rule nesting entered without consuming input, for the
    /// in-process recognizer
    pub max_depth: Option<usize>,
    /// Whether to annotate rules with their alternatives in the output
    pub emit_comments: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            target: Target::Rust,
            escape_mode: EscapeMode::Literal,
            max_depth: Some(2_000),
            emit_comments: true,
        }
    }
}

impl GeneratorConfig {
    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Load a configuration from a JSON string; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn with_escape_mode(mut self, escape_mode: EscapeMode) -> Self {
        self.escape_mode = escape_mode;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::GrammarError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GeneratorConfig::from_json_str(r#"{ "target": "c" }"#).unwrap();
        assert_eq!(config.target, Target::C);
        assert_eq!(config.escape_mode, EscapeMode::Literal);
        assert_eq!(config.max_depth, Some(2_000));
        assert!(config.emit_comments);
    }

    #[test]
    fn test_full_json_from_file() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            r#"{{ "target": "rust", "escape_mode": "skip", "max_depth": null, "emit_comments": false }}"#
        )?;

        let config = GeneratorConfig::from_json_file(file.path())?;
        assert_eq!(
            config,
            GeneratorConfig {
                target: Target::Rust,
                escape_mode: EscapeMode::Skip,
                max_depth: None,
                emit_comments: false,
            }
        );
        Ok(())
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = GeneratorConfig::from_json_str(r#"{ "target": "cobol" }"#).unwrap_err();
        assert!(matches!(err, GrammarError::Config(_)));
    }
}
