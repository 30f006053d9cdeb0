//! Config file discovery and resolution.
//!
//! Given a root command name, the resolver expands every [`SearchPath`] into
//! a stem, tries each configured extension against it (stem outer,
//! extension inner), and merges what it finds into a [`ConfigStore`]:
//!
//! 1. An explicit file bypasses the search. Any failure to read or parse it
//!    is returned to the caller.
//! 2. Otherwise candidates are tried in order. A candidate that is missing,
//!    unreadable, or malformed is skipped. With `merge_all` off the search
//!    stops at the first file loaded; with it on, every file found is merged
//!    and later files override earlier ones.
//! 3. Finding nothing is not an error; the store is left untouched.
//!
//! After each successful load the override section named by `override_key`
//! (typically the invoked subcommand) is merged over the top level and
//! removed.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::ClapbindError;
use crate::fs::{self, FileSystem};
use crate::keys::debug_dump;
use crate::source::read_source;
use crate::store::ConfigStore;
use crate::types::{Format, SearchPath};

/// Options controlling a single resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveOptions {
    explicit_file: Option<PathBuf>,
    override_key: Option<String>,
    search_paths: Vec<SearchPath>,
    extensions: Vec<Format>,
    merge_all: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            explicit_file: None,
            override_key: None,
            search_paths: SearchPath::defaults(),
            extensions: Format::defaults(),
            merge_all: false,
        }
    }
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load exactly this file instead of searching. An empty path is ignored.
    pub fn explicit_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.explicit_file = (!path.as_os_str().is_empty()).then_some(path);
        self
    }

    /// Name of the override section to apply after loading. Lower-cased; an
    /// empty name disables overrides.
    pub fn override_key(mut self, key: &str) -> Self {
        self.override_key = (!key.is_empty()).then(|| key.to_lowercase());
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

    /// Keep searching after the first hit and merge every file found.
    pub fn merge_all(mut self, merge_all: bool) -> Self {
        self.merge_all = merge_all;
        self
    }
}

/// Discovers and merges config files through a [`FileSystem`].
///
/// The environment is a snapshot taken at construction (or supplied with
/// [`with_env`](Self::with_env)) and is only used to build search stems.
pub struct ConfigResolver<'a> {
    fs: &'a dyn FileSystem,
    env: HashMap<String, String>,
    cwd: PathBuf,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self {
            fs,
            env: std::env::vars().collect(),
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Replace the environment snapshot.
    pub fn with_env(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env = vars.into_iter().collect();
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Resolve config files for `root_name` into `store`.
    ///
    /// Returns the files that were loaded, in load order.
    pub fn resolve(
        &self,
        store: &mut ConfigStore,
        root_name: &str,
        options: &ResolveOptions,
    ) -> Result<Vec<PathBuf>, ClapbindError> {
        if let Some(path) = &options.explicit_file {
            let path = self.absolute(path);
            let table = read_source(self.fs, &path)?;
            self.load(store, table, path.clone(), options)?;
            return Ok(vec![path]);
        }

        let mut loaded = Vec::new();
        for candidate in self.candidates(root_name, options) {
            if !self.fs.is_file(&candidate) {
                continue;
            }
            debug!(file = %candidate.display(), "reading config file");
            let table = match read_source(self.fs, &candidate) {
                Ok(table) => table,
                Err(e) if e.is_recoverable() => {
                    debug!(error = %e, "skipping config file");
                    continue;
                }
                Err(e) => return Err(e),
            };
            self.load(store, table, candidate.clone(), options)?;
            loaded.push(candidate);
            if !options.merge_all {
                break;
            }
        }

        if loaded.is_empty() {
            debug!("no config file found");
        } else if loaded.len() > 1 {
            info!("merged {} config files", loaded.len());
        }
        Ok(loaded)
    }

    fn load(
        &self,
        store: &mut ConfigStore,
        table: toml::Table,
        path: PathBuf,
        options: &ResolveOptions,
    ) -> Result<(), ClapbindError> {
        store.merge(table)?;
        info!("using config file: {}", path.display());
        store.set_config_file_used(path);

        if let Some(key) = &options.override_key
            && let Some(applied) = store.apply_override_section(key)?
        {
            info!("override sub-config: {applied}");
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            debug!("{}", debug_dump(store));
        }
        Ok(())
    }

    /// Every candidate file for `root_name`, in the order they are tried.
    pub fn candidates(&self, root_name: &str, options: &ResolveOptions) -> Vec<PathBuf> {
        let root = root_name.to_lowercase();
        let mut out = Vec::new();
        for sp in &options.search_paths {
            let Some(stem) = self.stem(sp, &root) else {
                debug!(search_path = ?sp, "search path cannot be resolved");
                continue;
            };
            for format in &options.extensions {
                let mut file: OsString = stem.clone().into_os_string();
                file.push(".");
                file.push(format.extension());
                out.push(PathBuf::from(file));
            }
        }
        out
    }

    /// Resolve a search path to an absolute stem (no extension).
    fn stem(&self, sp: &SearchPath, root: &str) -> Option<PathBuf> {
        let stem = match sp {
            SearchPath::XdgConfig => match self.var("XDG_CONFIG_HOME") {
                Some(xdg) => PathBuf::from(xdg).join(root).join("config"),
                None => self.home()?.join(".config").join(root).join("config"),
            },
            SearchPath::HomeDotfile => self.home()?.join(format!(".{root}")),
            SearchPath::CwdDotfile => self.cwd.join(format!(".{root}")),
            SearchPath::Template(template) => {
                PathBuf::from(self.expand_env(template).replace("{root}", root))
            }
        };
        Some(self.absolute(&stem))
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            fs::normalize(path)
        } else {
            fs::normalize(&self.cwd.join(path))
        }
    }

    /// A non-empty environment variable.
    fn var(&self, name: &str) -> Option<&str> {
        self.env
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    fn home(&self) -> Option<PathBuf> {
        match self.var("HOME") {
            Some(home) => Some(PathBuf::from(home)),
            None => directories::BaseDirs::new().map(|b| b.home_dir().to_path_buf()),
        }
    }

    /// Replace `$VAR` and `${VAR}` with their values; unset variables expand
    /// to the empty string.
    fn expand_env(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut next = 0;
        for (i, c) in input.char_indices() {
            if i < next {
                continue;
            }
            if c != '$' {
                out.push(c);
                continue;
            }
            let rest = &input[i + 1..];
            let name = if let Some(braced) = rest.strip_prefix('{') {
                let Some(end) = braced.find('}') else {
                    out.push(c);
                    continue;
                };
                next = i + 2 + end + 1;
                &braced[..end]
            } else {
                let len = rest
                    .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
                    .unwrap_or(rest.len());
                if len == 0 {
                    out.push(c);
                    continue;
                }
                next = i + 1 + len;
                &rest[..len]
            };
            out.push_str(self.env.get(name).map(String::as_str).unwrap_or(""));
        }
        out
    }
}
