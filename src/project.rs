//! Project a command tree's flags into a starter config file.
//!
//! Every visible flag becomes `name: value`, and every visible subcommand
//! with at least one visible flag (directly or below) becomes a nested
//! section named after it. The section layout is the same one the resolver
//! understands as subcommand override sections, so the generated file can be
//! edited and loaded as-is.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::command::CommandInfo;
use crate::error::ClapbindError;
use crate::fs::FileSystem;
use crate::types::OutputFormat;

pub type FlagTree = BTreeMap<String, FlagNode>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlagNode {
    Value(String),
    Command(FlagTree),
}

/// Build the flag tree for `command`.
///
/// Hidden and deprecated flags, inherited flags, and the reserved `help` and
/// `version` flags are left out. Hidden and deprecated subcommands are not
/// visited at all.
pub fn project(command: &CommandInfo) -> FlagTree {
    let mut tree = FlagTree::new();

    for flag in &command.flags {
        if flag.hidden || flag.deprecated || flag.inherited || flag.is_reserved() {
            continue;
        }
        tree.insert(flag.name.clone(), FlagNode::Value(flag.rendered()));
    }

    for child in &command.children {
        if child.hidden || child.deprecated {
            continue;
        }
        let sub = project(child);
        if !sub.is_empty() {
            tree.insert(child.name.clone(), FlagNode::Command(sub));
        }
    }

    tree
}

/// Serialize `tree` in `format`. JSON is indented by two spaces.
pub fn render_flag_tree(tree: &FlagTree, format: OutputFormat) -> Result<String, ClapbindError> {
    let serialize_error = |reason: String| ClapbindError::SerializeError { format, reason };
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(tree).map_err(|e| serialize_error(e.to_string())),
        OutputFormat::Toml => toml::to_string(tree).map_err(|e| serialize_error(e.to_string())),
        OutputFormat::Json => serde_json::to_string_pretty(tree)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| serialize_error(e.to_string())),
    }
}

/// Serialize `tree` to `writer` (typically stdout).
pub fn write_flag_tree(
    writer: &mut impl Write,
    tree: &FlagTree,
    format: OutputFormat,
) -> Result<(), ClapbindError> {
    let rendered = render_flag_tree(tree, format)?;
    writer
        .write_all(rendered.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(ClapbindError::Output)
}

/// Write `tree` to `path`, creating parent directories as needed.
pub fn write_starter_config(
    fs: &dyn FileSystem,
    path: &Path,
    tree: &FlagTree,
    format: OutputFormat,
) -> Result<(), ClapbindError> {
    let rendered = render_flag_tree(tree, format)?;
    let io_error = |source| ClapbindError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs.create_dir_all(parent).map_err(io_error)?;
    }
    fs.write(path, &rendered).map_err(io_error)
}
