use std::path::PathBuf;

use confique::Config;
use serde::{Deserialize, Serialize};
use toml::{Table, Value};
use tracing::debug;

use crate::command::{self, CommandInfo};
use crate::env;
use crate::error::ClapbindError;
use crate::fs::{FileSystem, OsFs};
use crate::keys::debug_dump;
use crate::overrides;
use crate::project::{self, project};
use crate::resolve::{ConfigResolver, ResolveOptions};
use crate::store::ConfigStore;
use crate::types::{ConfigAction, ConfigResult, Format, SearchPath};

/// Entry point for binding flags, config files, and environment variables.
pub struct Clapbind;

impl Clapbind {
    pub fn builder<'a>() -> ClapbindBuilder<'a> {
        ClapbindBuilder::new()
    }
}

enum Override {
    Key(String, Value),
    Table(Table),
}

/// Builder for a [`ConfigStore`] resolved from every layer.
///
/// Layers, lowest precedence first:
///
/// 1. flag defaults
/// 2. config files ([`search_paths()`](Self::search_paths), or
///    [`config_file()`](Self::config_file) / the `--config` flag)
/// 3. environment variables (`{PREFIX}__KEY`)
/// 4. flags given on the command line
/// 5. programmatic overrides ([`override_value()`](Self::override_value))
pub struct ClapbindBuilder<'a> {
    root_name: Option<String>,
    config_file: Option<PathBuf>,
    config_flag: String,
    override_key: Option<String>,
    search_paths: Vec<SearchPath>,
    extensions: Vec<Format>,
    merge_all: bool,
    env_prefix: Option<String>,
    env_enabled: bool,
    env_vars: Option<Vec<(String, String)>>,
    cwd: Option<PathBuf>,
    fs: &'a dyn FileSystem,
    overrides: Vec<Override>,
}

impl<'a> ClapbindBuilder<'a> {
    fn new() -> Self {
        Self {
            root_name: None,
            config_file: None,
            config_flag: "config".into(),
            override_key: None,
            search_paths: SearchPath::defaults(),
            extensions: Format::defaults(),
            merge_all: false,
            env_prefix: None,
            env_enabled: true,
            env_vars: None,
            cwd: None,
            fs: &OsFs,
            overrides: Vec::new(),
        }
    }

    /// Set the root command name. This derives:
    /// - the search stems (`~/.{root}`, `$XDG_CONFIG_HOME/{root}/config`, ...)
    /// - `env_prefix` → `"{ROOT}"` (upper-cased, `-` → `_`)
    pub fn root_name(mut self, name: &str) -> Self {
        self.root_name = Some(name.to_string());
        self
    }

    /// Load exactly this file and skip the search. Errors reading it are
    /// fatal.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Name of the flag whose explicitly set value selects the config file
    /// (default: `"config"`). Ignored when [`config_file()`](Self::config_file)
    /// is set.
    pub fn config_flag(mut self, name: &str) -> Self {
        self.config_flag = name.to_string();
        self
    }

    /// Name of the override section to apply. Defaults to the invoked
    /// subcommand's name; nothing is applied when the root itself runs.
    pub fn override_key(mut self, key: &str) -> Self {
        self.override_key = Some(key.to_string());
        self
    }

    /// Replace the search stems. Earlier entries are tried first.
    pub fn search_paths(mut self, paths: Vec<SearchPath>) -> Self {
        self.search_paths = paths;
        self
    }

    /// Replace the extension order tried for every stem.
    pub fn extensions(mut self, extensions: Vec<Format>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Merge every file found instead of stopping at the first.
    pub fn merge_all(mut self, merge_all: bool) -> Self {
        self.merge_all = merge_all;
        self
    }

    /// Override the environment variable prefix.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Disable environment variable loading entirely.
    pub fn no_env(mut self) -> Self {
        self.env_enabled = false;
        self
    }

    /// Use this environment snapshot instead of `std::env::vars()`. It feeds
    /// both the search stems and the `{PREFIX}__*` layer.
    pub fn env_vars(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env_vars = Some(vars.into_iter().collect());
        self
    }

    /// Working directory for relative paths (default: the process cwd).
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn file_system(mut self, fs: &'a dyn FileSystem) -> Self {
        self.fs = fs;
        self
    }

    /// Add a highest-precedence override. `None` values are ignored (useful
    /// for optional clap args).
    pub fn override_value<V: Into<Value>>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.overrides.push(Override::Key(key.to_string(), v.into()));
        }
        self
    }

    /// Add overrides from any serializable struct or map. `None` fields are
    /// skipped. Composes with [`override_value`](Self::override_value); later
    /// calls take precedence.
    pub fn overrides_from<S: Serialize>(mut self, source: &S) -> Result<Self, ClapbindError> {
        let table = overrides::serialized_to_table(source)?;
        self.overrides.push(Override::Table(table));
        Ok(self)
    }

    fn effective_root_name(&self) -> Result<&str, ClapbindError> {
        self.root_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or(ClapbindError::RootNameRequired)
    }

    /// Resolve the effective env prefix (None if env disabled).
    fn effective_env_prefix(&self) -> Result<Option<String>, ClapbindError> {
        if !self.env_enabled {
            return Ok(None);
        }
        if let Some(prefix) = &self.env_prefix {
            return Ok(Some(prefix.clone()));
        }
        Ok(Some(env::default_prefix(self.effective_root_name()?)))
    }

    fn effective_config_file(&self, command: &CommandInfo, invoked_path: &[&str]) -> Option<PathBuf> {
        if let Some(path) = &self.config_file {
            return Some(path.clone());
        }
        command
            .ancestors(invoked_path)
            .into_iter()
            .flat_map(|c| &c.flags)
            .filter(|f| f.explicitly_set && f.name == self.config_flag)
            .filter_map(|f| f.value.as_ref()?.as_str())
            .filter(|s| !s.is_empty())
            .last()
            .map(PathBuf::from)
    }

    fn resolve_options(&self, command: &CommandInfo, invoked_path: &[&str]) -> ResolveOptions {
        let mut options = ResolveOptions::new()
            .search_paths(self.search_paths.clone())
            .extensions(self.extensions.clone())
            .merge_all(self.merge_all);
        if let Some(path) = self.effective_config_file(command, invoked_path) {
            options = options.explicit_file(path);
        }
        let key = self.override_key.as_deref().or(invoked_path.last().copied());
        if let Some(key) = key {
            options = options.override_key(key);
        }
        options
    }

    fn env_snapshot(&self) -> Vec<(String, String)> {
        match &self.env_vars {
            Some(vars) => vars.clone(),
            None => std::env::vars().collect(),
        }
    }

    fn resolver(&self, env: Vec<(String, String)>) -> ConfigResolver<'a> {
        let resolver = ConfigResolver::new(self.fs).with_env(env);
        match &self.cwd {
            Some(cwd) => resolver.with_cwd(cwd.clone()),
            None => resolver,
        }
    }

    /// Resolve every layer into `store` for an invocation of `invoked_path`
    /// (subcommand names below the root). Returns the config files loaded.
    pub fn bind(
        &self,
        store: &mut ConfigStore,
        command: &CommandInfo,
        invoked_path: &[&str],
    ) -> Result<Vec<PathBuf>, ClapbindError> {
        let root_name = self.effective_root_name()?;
        let env_vars = self.env_snapshot();

        let options = self.resolve_options(command, invoked_path);
        let files = self
            .resolver(env_vars.clone())
            .resolve(store, root_name, &options)?;

        if let Some(prefix) = self.effective_env_prefix()? {
            let table = env::env_to_table(&prefix, env_vars);
            if !table.is_empty() {
                debug!(prefix = %prefix, "merging environment variables");
                store.merge(table)?;
            }
        }

        command::bind_flags(store, command, invoked_path)?;

        for o in &self.overrides {
            match o {
                Override::Key(key, value) => store.set(key, value.clone())?,
                Override::Table(table) => store.merge(table.clone())?,
            }
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            debug!("{}", debug_dump(store));
        }
        Ok(files)
    }

    /// Bind into a fresh store and deserialize it into a typed config.
    pub fn load<C: Config>(
        &self,
        command: &CommandInfo,
        invoked_path: &[&str],
    ) -> Result<C, ClapbindError>
    where
        C::Layer: for<'de> Deserialize<'de>,
    {
        let mut store = ConfigStore::new();
        self.bind(&mut store, command, invoked_path)?;
        store.extract()
    }

    /// Handle a `ConfigAction` and print the result to stdout.
    pub fn handle_and_print(
        &self,
        action: &ConfigAction,
        command: &CommandInfo,
    ) -> Result<(), ClapbindError> {
        let result = self.handle(action, command)?;
        print!("{result}");
        Ok(())
    }

    /// Handle a `ConfigAction` against the root `command`.
    pub fn handle(
        &self,
        action: &ConfigAction,
        command: &CommandInfo,
    ) -> Result<ConfigResult, ClapbindError> {
        match action {
            ConfigAction::Gen { format, output } => {
                let tree = project(command);
                match output {
                    Some(path) => {
                        let path = match &self.cwd {
                            Some(cwd) if path.is_relative() => cwd.join(path),
                            _ => path.clone(),
                        };
                        project::write_starter_config(self.fs, &path, &tree, *format)?;
                        Ok(ConfigResult::Written { path })
                    }
                    None => Ok(ConfigResult::Generated(project::render_flag_tree(
                        &tree, *format,
                    )?)),
                }
            }
        }
    }
}
