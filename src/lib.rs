//! Bind CLI flags, config files, and environment variables into one
//! configuration view, resolved once before a command runs.
//!
//! Clapbind discovers a config file for your root command, merges the
//! subcommand's override section, layers `{PREFIX}__*` environment variables
//! and flags on top, and hands you a [`ConfigStore`] to query (or a typed
//! [confique](https://docs.rs/confique) struct).
//!
//! ```ignore
//! let cmd = RootFlags::default().apply(Cli::command());
//! let matches = cmd.clone().get_matches();
//! let path = invoked_path(&matches);
//! let path: Vec<&str> = path.iter().map(String::as_str).collect();
//!
//! let mut store = ConfigStore::new();
//! Clapbind::builder()
//!     .root_name("myapp")
//!     .bind(&mut store, &command_info(&cmd, Some(&matches)), &path)?;
//! ```
//!
//! # Layer precedence
//!
//! ```text
//! Flag defaults         values of flags the user did not pass
//!        ↑ overridden by
//! Config file(s)        first file found, or every file with merge_all
//!        ↑ overridden by
//! Environment vars      PREFIX__KEY
//!        ↑ overridden by
//! Flags                 passed on the command line
//!        ↑ overridden by
//! Overrides             .override_value()
//! ```
//!
//! Every layer is sparse: unset keys fall through to the layer below.
//!
//! # Discovery
//!
//! With root name `myapp`, each [`SearchPath`] expands to a stem and every
//! [`Format`] extension is tried against it before moving to the next stem:
//!
//! ```text
//! $XDG_CONFIG_HOME/myapp/config.{json,toml,yaml,yml}   (~/.config when unset)
//! ~/.myapp.{json,toml,yaml,yml}
//! ./.myapp.{json,toml,yaml,yml}
//! ```
//!
//! The search stops at the first file that loads unless
//! [`merge_all`](ClapbindBuilder::merge_all) is on. Missing, unreadable, and
//! malformed candidates are skipped (and logged at debug level). An explicit
//! file, from [`config_file()`](ClapbindBuilder::config_file) or the
//! `--config` flag, replaces the search entirely and any error reading it is
//! returned.
//!
//! # Override sections
//!
//! A top-level table named after the invoked subcommand (matched
//! case-insensitively) is merged over the top level and then removed:
//!
//! ```yaml
//! port: 8080
//! serve:
//!   port: 9000   # wins when `myapp serve` runs
//! ```
//!
//! # Environment variables
//!
//! With env prefix `MYAPP`, variables map via double-underscore nesting:
//!
//! | Env var | Config key |
//! |---------|------------|
//! | `MYAPP__HOST` | `host` |
//! | `MYAPP__DATABASE__URL` | `database.url` |
//!
//! Values are parsed heuristically: `true`/`false` → bool, then integer,
//! then float, then string.
//!
//! # Starter configs
//!
//! [`project()`] turns the command tree into a nested map of every visible
//! flag, which [`ConfigAction::Gen`] renders as YAML, TOML, or JSON. The
//! output uses the same override-section layout the resolver reads.
//!
//! # Logging
//!
//! Clapbind logs through [tracing](https://docs.rs/tracing): the file in use
//! at `info`, skipped candidates and the full resolved dump at `debug`.
//! [`verbosity_level()`] and [`level_filter()`] turn `--verbose`/`--quiet`
//! into a filter for whatever subscriber the application installs.
//!
//! # Input files
//!
//! [`open_or_stdin()`] opens a path through the same [`fs::FileSystem`] the
//! resolver uses, or reads stdin when no path is given. An interactive
//! terminal is refused unless [`InputOptions::manual_input`] is set.
//!
//! # Clap adapter
//!
//! The `cli` module (behind the `clap` feature, on by default) provides
//! [`RootFlags`], [`command_info()`], [`invoked_path()`], and
//! [`GenConfigArgs`]. Argument ids are normalized with [`snake_to_kebab()`],
//! so `dry_run` binds as `dry-run`. Without the feature, build
//! [`CommandInfo`] by hand.

pub mod error;
pub mod fs;
pub mod types;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod command;
mod env;
mod input;
mod keys;
pub(crate) mod merge;
mod overrides;
mod pipeline;
mod project;
mod resolve;
mod source;
mod store;
mod verbosity;

#[cfg(test)]
mod fixtures;

pub use builder::{Clapbind, ClapbindBuilder};
#[cfg(feature = "clap")]
pub use cli::{GenConfigArgs, RootFlags, command_info, invoked_path};
pub use command::{CommandInfo, FlagInfo, bind_flags, snake_to_kebab};
pub use env::{default_prefix, env_to_table};
pub use error::ClapbindError;
pub use input::{InputOptions, open_or_stdin};
pub use keys::{compare_keys, debug_dump, sort_keys};
pub use merge::try_merge;
pub use pipeline::SetupPipeline;
pub use project::{
    FlagNode, FlagTree, project, render_flag_tree, write_flag_tree, write_starter_config,
};
pub use resolve::{ConfigResolver, ResolveOptions};
pub use source::read_source;
pub use store::ConfigStore;
pub use types::{ConfigAction, ConfigResult, Format, OutputFormat, SearchPath};
pub use verbosity::{VerbosityOptions, level_filter, verbosity_count, verbosity_level};
