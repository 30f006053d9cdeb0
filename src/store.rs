//! The resolved configuration view.
//!
//! A [`ConfigStore`] holds two layers: `values`, built up by merging sources
//! in precedence order (last merge wins), and `defaults`, a lower-precedence
//! layer consulted only for keys `values` does not have. Flag defaults land
//! in `defaults` so a config file can still override an unset flag.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use confique::Config;
use serde::Deserialize;
use toml::{Table, Value};

use crate::error::ClapbindError;
use crate::merge::{merge_under, try_merge};
use crate::overrides;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    values: Table,
    defaults: Table,
    config_file_used: Option<PathBuf>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep-merge `table` over the current values. On error the store is
    /// left untouched.
    pub fn merge(&mut self, table: Table) -> Result<(), ClapbindError> {
        self.values = try_merge(self.values.clone(), table)?;
        Ok(())
    }

    /// Deep-merge `table` into the lower-precedence default layer. On error
    /// the store is left untouched.
    pub fn merge_defaults(&mut self, table: Table) -> Result<(), ClapbindError> {
        self.defaults = try_merge(self.defaults.clone(), table)?;
        Ok(())
    }

    /// Set a single dotted key in the value layer.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), ClapbindError> {
        let mut table = Table::new();
        overrides::set_nested(&mut table, key, value.into())?;
        self.merge(table)
    }

    /// Look up a dotted key, falling back to the default layer.
    pub fn get(&self, key: &str) -> Option<&Value> {
        table_get(&self.values, key).or_else(|| table_get(&self.defaults, key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    /// Boolean lookup. `"true"`/`"false"` strings are accepted.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Boolean(b) => Some(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    /// Integer lookup. Numeric strings are accepted.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Integer(i) => Some(*i),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Remove a dotted key from both layers. Returns the removed value,
    /// preferring the value layer.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let from_values = table_remove(&mut self.values, key);
        let from_defaults = table_remove(&mut self.defaults, key);
        from_values.or(from_defaults)
    }

    /// Top-level key of the value layer matching `name` case-insensitively.
    pub(crate) fn find_top_level(&self, name: &str) -> Option<String> {
        if self.values.contains_key(name) {
            return Some(name.to_string());
        }
        self.values
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Merge the top-level map named `name` (matched case-insensitively) over
    /// the top level, then drop the section itself. A missing or non-map
    /// section is a no-op. Returns the key that was applied.
    pub fn apply_override_section(&mut self, name: &str) -> Result<Option<String>, ClapbindError> {
        let Some(found) = self.find_top_level(name) else {
            return Ok(None);
        };
        let Some(Value::Table(section)) = self.values.get(&found).cloned() else {
            return Ok(None);
        };
        self.merge(section)?;
        self.values.remove(&found);
        Ok(Some(found))
    }

    /// The merged view: defaults overlaid by values.
    pub fn settings(&self) -> Table {
        merge_under(self.values.clone(), self.defaults.clone())
    }

    /// Every leaf key (dotted) present in either layer, deduplicated.
    pub fn all_keys(&self) -> Vec<String> {
        let mut keys = BTreeSet::new();
        collect_leaf_keys(&self.settings(), "", &mut keys);
        keys.into_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.defaults.is_empty()
    }

    /// The most recently loaded config file, if any.
    pub fn config_file_used(&self) -> Option<&Path> {
        self.config_file_used.as_deref()
    }

    pub(crate) fn set_config_file_used(&mut self, path: PathBuf) {
        self.config_file_used = Some(path);
    }

    /// Deserialize the merged view into a typed confique config. confique fills
    /// `#[config(default)]` values and validates required fields.
    pub fn extract<C: Config>(&self) -> Result<C, ClapbindError>
    where
        C::Layer: for<'de> Deserialize<'de>,
    {
        let layer: C::Layer = Value::Table(self.settings())
            .try_into()
            .map_err(|e: toml::de::Error| ClapbindError::InvalidValue {
                key: "<merged>".into(),
                reason: e.to_string(),
            })?;

        C::builder()
            .preloaded(layer)
            .load()
            .map_err(ClapbindError::from)
    }
}

/// Navigate a `toml::Table` by dotted key path (e.g. `"database.url"`).
pub fn table_get<'a>(table: &'a Table, dotted_key: &str) -> Option<&'a Value> {
    let (path, leaf) = match dotted_key.rsplit_once('.') {
        Some((p, l)) => (Some(p), l),
        None => (None, dotted_key),
    };

    let tbl = match path {
        Some(path) => {
            let mut current = table;
            for segment in path.split('.') {
                current = current.get(segment)?.as_table()?;
            }
            current
        }
        None => table,
    };

    tbl.get(leaf)
}

fn table_remove(table: &mut Table, dotted_key: &str) -> Option<Value> {
    match dotted_key.split_once('.') {
        None => table.remove(dotted_key),
        Some((head, rest)) => table_remove(table.get_mut(head)?.as_table_mut()?, rest),
    }
}

fn collect_leaf_keys(table: &Table, prefix: &str, keys: &mut BTreeSet<String>) {
    for (key, value) in table {
        let dotted = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Table(sub) if !sub.is_empty() => collect_leaf_keys(sub, &dotted, keys),
            _ => {
                keys.insert(dotted);
            }
        }
    }
}
