//! A framework-neutral description of a command tree.
//!
//! [`CommandInfo`] is what the binder and the projector read. The `clap`
//! adapter builds one from a `clap::Command` and its matches; other argument
//! parsers (or tests) can build it by hand:
//!
//! ```
//! use clapbind::{CommandInfo, FlagInfo};
//!
//! let cmd = CommandInfo::new("app")
//!     .flag(FlagInfo::new("verbose", 0))
//!     .child(CommandInfo::new("serve").flag(FlagInfo::new("port", 8080).set()));
//! assert!(cmd.find_path(&["serve"]).is_some());
//! ```

use toml::{Table, Value};
use tracing::debug;

use crate::error::ClapbindError;
use crate::keys::format_value;
use crate::store::ConfigStore;

/// Flag names that are never bound or projected.
pub const RESERVED_FLAGS: [&str; 2] = ["help", "version"];

/// Normalize a flag name from `snake_case` to `kebab-case`.
pub fn snake_to_kebab(name: &str) -> String {
    name.replace('_', "-")
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlagInfo {
    pub name: String,
    /// Current value: the parsed value when set, otherwise the default.
    /// `None` when the flag has neither.
    pub value: Option<Value>,
    /// True when the user supplied the flag on the command line.
    pub explicitly_set: bool,
    pub hidden: bool,
    pub deprecated: bool,
    /// True when the flag is declared on an ancestor and only visible here.
    pub inherited: bool,
}

impl FlagInfo {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::unset(name)
        }
    }

    /// A flag with no value and no default.
    pub fn unset(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            explicitly_set: false,
            hidden: false,
            deprecated: false,
            inherited: false,
        }
    }

    /// Mark the flag as supplied on the command line.
    pub fn set(mut self) -> Self {
        self.explicitly_set = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn inherited(mut self) -> Self {
        self.inherited = true;
        self
    }

    pub fn is_reserved(&self) -> bool {
        RESERVED_FLAGS.contains(&self.name.as_str())
    }

    /// The value as a display string; empty when there is none.
    pub fn rendered(&self) -> String {
        self.value.as_ref().map(format_value).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandInfo {
    pub name: String,
    pub hidden: bool,
    pub deprecated: bool,
    pub flags: Vec<FlagInfo>,
    pub children: Vec<CommandInfo>,
}

impl CommandInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hidden: false,
            deprecated: false,
            flags: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn flag(mut self, flag: FlagInfo) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn child(mut self, child: CommandInfo) -> Self {
        self.children.push(child);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// The descendant reached by following `path` (child names, root
    /// excluded). An empty path is `self`.
    pub fn find_path(&self, path: &[&str]) -> Option<&CommandInfo> {
        match path.split_first() {
            None => Some(self),
            Some((head, rest)) => self
                .children
                .iter()
                .find(|c| c.name == *head)?
                .find_path(rest),
        }
    }

    /// `self` followed by every command along `path`, root first. Stops at
    /// the first name that does not match a child.
    pub fn ancestors(&self, path: &[&str]) -> Vec<&CommandInfo> {
        let mut chain = vec![self];
        let mut current = self;
        for name in path {
            let Some(next) = current.children.iter().find(|c| c.name == *name) else {
                break;
            };
            chain.push(next);
            current = next;
        }
        chain
    }
}

/// Bind the flags of every command on `invoked_path` into `store`.
///
/// Explicitly set flags go to the value layer and therefore beat files and
/// environment variables merged before them. Flags left at their default go
/// to the default layer and only fill keys nothing else provides. Deeper
/// commands are bound after their ancestors.
pub fn bind_flags(
    store: &mut ConfigStore,
    command: &CommandInfo,
    invoked_path: &[&str],
) -> Result<(), ClapbindError> {
    let mut defaults = Table::new();
    for cmd in command.ancestors(invoked_path) {
        for flag in cmd.flags.iter().filter(|f| !f.is_reserved()) {
            let Some(value) = &flag.value else {
                continue;
            };
            if flag.explicitly_set {
                debug!(flag = %flag.name, command = %cmd.name, "binding explicit flag");
                store.set(&flag.name, value.clone())?;
            } else {
                defaults.insert(flag.name.clone(), value.clone());
            }
        }
    }
    store.merge_defaults(defaults)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::sample_command;

    #[test]
    fn snake_case_names_become_kebab() {
        assert_eq!(snake_to_kebab("dry_run"), "dry-run");
        assert_eq!(snake_to_kebab("max__retry_count"), "max--retry-count");
        assert_eq!(snake_to_kebab("already-kebab"), "already-kebab");
    }

    #[test]
    fn find_path_walks_children() {
        let cmd = sample_command();
        assert_eq!(cmd.find_path(&[]).unwrap().name, "app");
        assert_eq!(cmd.find_path(&["db", "migrate"]).unwrap().name, "migrate");
        assert!(cmd.find_path(&["db", "nope"]).is_none());
    }

    #[test]
    fn ancestors_are_root_first_and_stop_at_unknown_names() {
        let cmd = sample_command();
        let names: Vec<&str> = cmd
            .ancestors(&["db", "migrate"])
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["app", "db", "migrate"]);

        let names: Vec<&str> = cmd
            .ancestors(&["serve", "bogus"])
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["app", "serve"]);
    }

    #[test]
    fn rendered_values() {
        assert_eq!(FlagInfo::new("port", 8080).rendered(), "8080");
        assert_eq!(FlagInfo::new("name", "x").rendered(), "x");
        assert_eq!(FlagInfo::unset("output").rendered(), "");
    }

    #[test]
    fn explicit_flags_beat_files_and_defaults_fill_gaps() {
        let mut store = ConfigStore::new();
        store
            .merge("port = 1\nhost = \"file-host\"\n".parse().unwrap())
            .unwrap();

        let cmd = CommandInfo::new("app")
            .flag(FlagInfo::new("host", "flag-host"))
            .flag(FlagInfo::new("verbose", 0))
            .flag(FlagInfo::new("help", false))
            .child(
                CommandInfo::new("serve")
                    .flag(FlagInfo::new("port", 9000).set())
                    .flag(FlagInfo::unset("bind")),
            );
        bind_flags(&mut store, &cmd, &["serve"]).unwrap();

        assert_eq!(store.get_i64("port"), Some(9000));
        assert_eq!(store.get_str("host"), Some("file-host"));
        assert_eq!(store.get_i64("verbose"), Some(0));
        assert!(!store.contains("help"));
        assert!(!store.contains("bind"));
    }

    #[test]
    fn only_invoked_branch_is_bound() {
        let mut store = ConfigStore::new();
        bind_flags(&mut store, &sample_command(), &["serve"]).unwrap();
        assert_eq!(store.get_i64("port"), Some(8080));
        assert!(!store.contains("steps"));
    }

    #[test]
    fn hidden_flags_are_still_bound() {
        let mut store = ConfigStore::new();
        let cmd = CommandInfo::new("app").flag(FlagInfo::new("secret", "s").hidden().set());
        bind_flags(&mut store, &cmd, &[]).unwrap();
        assert_eq!(store.get_str("secret"), Some("s"));
    }
}
