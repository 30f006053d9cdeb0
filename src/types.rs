//! Shared vocabulary types: where to search, which formats to read, and
//! which formats to emit.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ClapbindError;

/// A candidate location (without extension) for a config file.
///
/// The default search order is `[XdgConfig, HomeDotfile, CwdDotfile]`.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// `$XDG_CONFIG_HOME/{root}/config`, or `{home}/.config/{root}/config`
    /// when `XDG_CONFIG_HOME` is unset.
    XdgConfig,
    /// `{home}/.{root}`
    HomeDotfile,
    /// `./.{root}`, relative to the working directory.
    CwdDotfile,
    /// A custom stem. `{root}` is replaced with the root command name and
    /// `$VAR` / `${VAR}` are expanded from the environment. Relative stems
    /// resolve against the working directory.
    Template(String),
}

impl SearchPath {
    pub fn defaults() -> Vec<SearchPath> {
        vec![
            SearchPath::XdgConfig,
            SearchPath::HomeDotfile,
            SearchPath::CwdDotfile,
        ]
    }
}

/// A config file format, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
    Yaml,
    Yml,
}

impl Format {
    pub fn defaults() -> Vec<Format> {
        vec![Format::Json, Format::Toml, Format::Yaml, Format::Yml]
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Toml => "toml",
            Format::Yaml => "yaml",
            Format::Yml => "yml",
        }
    }

    /// Detect the format of `path` from its extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Format::Json),
            "toml" => Some(Format::Toml),
            "yaml" => Some(Format::Yaml),
            "yml" => Some(Format::Yml),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Serialization format for generated starter config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Toml,
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Yaml => "yaml",
            OutputFormat::Toml => "toml",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ClapbindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" => Ok(OutputFormat::Yaml),
            "toml" => Ok(OutputFormat::Toml),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ClapbindError::InvalidFormat { value: s.into() }),
        }
    }
}

/// A config operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    /// Project the command tree's flags into a starter config file.
    Gen {
        format: OutputFormat,
        output: Option<PathBuf>,
    },
}

/// Result of a config action. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigResult {
    /// The rendered starter config.
    Generated(String),
    /// Confirmation that the starter config was written to a file.
    Written { path: PathBuf },
}

impl fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigResult::Generated(text) => write!(f, "{text}"),
            ConfigResult::Written { path } => {
                writeln!(f, "Config written to {}", path.display())
            }
        }
    }
}
