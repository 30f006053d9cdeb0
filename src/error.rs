use std::path::PathBuf;
use thiserror::Error;

use crate::types::{Format, OutputFormat};

/// Boxed error for sources whose concrete error type varies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ClapbindError {
    #[error("Config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path} as {format}: {source}")]
    ParseError {
        path: PathBuf,
        format: Format,
        source: BoxError,
    },

    #[error("Unsupported config file extension: {path} (expected one of json, toml, yaml, yml)")]
    UnsupportedFormat { path: PathBuf },

    #[error("Cannot merge '{key}': {reason}")]
    MergeError { key: String, reason: String },

    #[error("Invalid output format '{value}': must be one of \"yaml\", \"json\", or \"toml\"")]
    InvalidFormat { value: String },

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to serialize config as {format}: {reason}")]
    SerializeError {
        format: OutputFormat,
        reason: String,
    },

    #[error("Failed to write config output: {0}")]
    Output(#[source] std::io::Error),

    #[error("Setup for '{command}' failed: {source}")]
    Setup { command: String, source: BoxError },

    #[error("Configuration error: {0}")]
    ConfigError(#[from] confique::Error),

    #[error("No input file specified and stdin is a terminal")]
    NoFileSpecified,

    #[error("Root command name is required — call .root_name() on the builder")]
    RootNameRequired,
}

impl ClapbindError {
    /// True for the errors a config search treats as "no file here".
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ClapbindError::NotFound { .. }
                | ClapbindError::Io { .. }
                | ClapbindError::ParseError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_formats_path() {
        let err = ClapbindError::NotFound {
            path: "/home/user/.config/myapp/config.yaml".into(),
        };
        assert!(err.to_string().contains("config.yaml"));
    }

    #[test]
    fn invalid_format_lists_accepted_values() {
        let err = ClapbindError::InvalidFormat {
            value: "xml".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("xml"));
        assert!(msg.contains("yaml"));
        assert!(msg.contains("json"));
        assert!(msg.contains("toml"));
    }

    #[test]
    fn merge_error_names_key() {
        let err = ClapbindError::MergeError {
            key: "database.url".into(),
            reason: "table vs scalar".into(),
        };
        assert!(err.to_string().contains("database.url"));
    }

    #[test]
    fn root_name_required_formats() {
        let err = ClapbindError::RootNameRequired;
        assert!(err.to_string().contains("root_name"));
    }

    #[test]
    fn merge_error_is_not_recoverable() {
        let err = ClapbindError::MergeError {
            key: "a".into(),
            reason: "b".into(),
        };
        assert!(!err.is_recoverable());
        assert!(ClapbindError::NotFound { path: "x".into() }.is_recoverable());
    }
}
