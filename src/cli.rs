//! Clap adapter for clapbind.
//!
//! This module is the **optional integration layer** between clapbind's
//! framework-agnostic core and the [clap](https://docs.rs/clap) CLI parser.
//! It is compiled only when the `clap` Cargo feature is enabled (on by
//! default).
//!
//! It provides three pieces:
//!
//! - [`RootFlags`] adds the conventional `--config`, `--no-color`,
//!   `--verbose` and `--quiet` global flags to a root command.
//! - [`command_info()`] and [`invoked_path()`] turn a `clap::Command` and its
//!   matches into the [`CommandInfo`] the binder and projector read.
//! - [`GenConfigArgs`] is a derive struct for a config-generation
//!   subcommand; [`into_action()`](GenConfigArgs::into_action) bridges it to
//!   [`ClapbindBuilder::handle()`](crate::ClapbindBuilder::handle).

use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Args, Command, ValueHint};
use toml::Value;

use crate::command::{CommandInfo, FlagInfo, snake_to_kebab};
use crate::error::ClapbindError;
use crate::types::{ConfigAction, OutputFormat};

/// The global flags every root command gets. Set a name to `None` to leave
/// that flag out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootFlags {
    pub config: Option<String>,
    pub no_color: Option<String>,
    pub verbose: Option<String>,
    pub quiet: Option<String>,
}

impl Default for RootFlags {
    fn default() -> Self {
        Self {
            config: Some("config".into()),
            no_color: Some("no-color".into()),
            verbose: Some("verbose".into()),
            quiet: Some("quiet".into()),
        }
    }
}

impl RootFlags {
    /// Add the flags to `cmd` as global args. `--verbose` (`-v`, counted)
    /// and `--quiet` (`-q`) conflict with each other.
    pub fn apply(&self, mut cmd: Command) -> Command {
        if let Some(name) = &self.config {
            cmd = cmd.arg(
                Arg::new(name.clone())
                    .long(name.clone())
                    .value_name("FILE")
                    .value_hint(ValueHint::FilePath)
                    .global(true)
                    .help("Config file (default: search the XDG config dir, home, then the current dir)"),
            );
        }
        if let Some(name) = &self.no_color {
            cmd = cmd.arg(
                Arg::new(name.clone())
                    .long(name.clone())
                    .action(ArgAction::SetTrue)
                    .global(true)
                    .help("Disable colored output"),
            );
        }
        if let Some(name) = &self.verbose {
            let mut arg = Arg::new(name.clone())
                .long(name.clone())
                .short('v')
                .action(ArgAction::Count)
                .global(true)
                .help("Increase log verbosity (repeatable)");
            if let Some(quiet) = &self.quiet {
                arg = arg.conflicts_with(quiet.clone());
            }
            cmd = cmd.arg(arg);
        }
        if let Some(name) = &self.quiet {
            cmd = cmd.arg(
                Arg::new(name.clone())
                    .long(name.clone())
                    .short('q')
                    .action(ArgAction::SetTrue)
                    .global(true)
                    .help("Suppress all log output"),
            );
        }
        cmd
    }
}

/// Describe `cmd` and its subcommands.
///
/// With `matches`, values come from the parse (count → integer, flag → bool,
/// everything else → string, or array of strings for appending args) and a
/// flag is explicitly set when its value came from the command line.
/// Without, values are the declared defaults. Positional arguments and
/// help/version actions are skipped. Global args declared on an ancestor are
/// marked inherited wherever they reappear.
pub fn command_info(cmd: &Command, matches: Option<&ArgMatches>) -> CommandInfo {
    build_info(cmd, matches, &[])
}

fn build_info(cmd: &Command, matches: Option<&ArgMatches>, inherited: &[String]) -> CommandInfo {
    let mut info = CommandInfo::new(cmd.get_name());
    info.hidden = cmd.is_hide_set();

    let mut globals = inherited.to_vec();
    for arg in cmd.get_arguments() {
        if arg.is_positional() || is_meta(arg.get_action()) {
            continue;
        }
        let id = arg.get_id().as_str().to_string();
        let mut flag = FlagInfo::unset(snake_to_kebab(&id));
        flag.value = matches
            .and_then(|m| matched_value(arg, m))
            .or_else(|| default_value(arg));
        flag.explicitly_set =
            matches.is_some_and(|m| m.value_source(&id) == Some(ValueSource::CommandLine));
        flag.hidden = arg.is_hide_set();
        flag.inherited = inherited.contains(&id);
        if arg.is_global_set() && !flag.inherited {
            globals.push(id);
        }
        info.flags.push(flag);
    }

    for sub in cmd.get_subcommands() {
        let sub_matches = matches.and_then(|m| m.subcommand_matches(sub.get_name()));
        info.children.push(build_info(sub, sub_matches, &globals));
    }
    info
}

fn is_meta(action: &ArgAction) -> bool {
    matches!(
        action,
        ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong | ArgAction::Version
    )
}

fn matched_value(arg: &Arg, matches: &ArgMatches) -> Option<Value> {
    let id = arg.get_id().as_str();
    match arg.get_action() {
        ArgAction::Count => matches
            .try_get_one::<u8>(id)
            .ok()
            .flatten()
            .map(|c| Value::Integer(i64::from(*c))),
        ArgAction::SetTrue | ArgAction::SetFalse => matches
            .try_get_one::<bool>(id)
            .ok()
            .flatten()
            .map(|b| Value::Boolean(*b)),
        action => {
            let raw = matches.try_get_raw(id).ok().flatten()?;
            strings_to_value(
                raw.map(|v| v.to_string_lossy().into_owned()).collect(),
                matches!(action, ArgAction::Append),
            )
        }
    }
}

fn default_value(arg: &Arg) -> Option<Value> {
    match arg.get_action() {
        ArgAction::Count => Some(Value::Integer(0)),
        ArgAction::SetTrue => Some(Value::Boolean(false)),
        ArgAction::SetFalse => Some(Value::Boolean(true)),
        action => strings_to_value(
            arg.get_default_values()
                .iter()
                .map(|v| v.to_string_lossy().into_owned())
                .collect(),
            matches!(action, ArgAction::Append),
        ),
    }
}

fn strings_to_value(values: Vec<String>, many: bool) -> Option<Value> {
    if many {
        return (!values.is_empty())
            .then(|| Value::Array(values.into_iter().map(Value::String).collect()));
    }
    values.into_iter().next().map(Value::String)
}

/// Names of the invoked subcommand chain below the root.
pub fn invoked_path(matches: &ArgMatches) -> Vec<String> {
    let mut path = Vec::new();
    let mut current = matches;
    while let Some((name, sub)) = current.subcommand() {
        path.push(name.to_string());
        current = sub;
    }
    path
}

/// Clap-derived args for a config-generation subcommand.
///
/// Embed this into your app's clap derive:
/// ```ignore
/// #[derive(Subcommand)]
/// enum Commands {
///     /// Print a starter config file built from every flag.
///     GenConfig(GenConfigArgs),
/// }
/// ```
#[derive(Debug, Args)]
pub struct GenConfigArgs {
    /// Output format: yaml, toml, or json.
    #[arg(short, long, default_value = "yaml", value_parser = parse_output_format)]
    pub format: OutputFormat,

    /// Write to a file instead of stdout.
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

fn parse_output_format(s: &str) -> Result<OutputFormat, String> {
    s.parse().map_err(|e: ClapbindError| e.to_string())
}

impl GenConfigArgs {
    /// Convert clap-parsed args into a framework-agnostic `ConfigAction`.
    pub fn into_action(self) -> ConfigAction {
        ConfigAction::Gen {
            format: self.format,
            output: self.output,
        }
    }
}
