//! Environment variable layer.
//!
//! With prefix `MYAPP`, `MYAPP__DATABASE__URL=pg://` becomes
//! `database.url = "pg://"`. `__` separates nesting levels, a single `_` is
//! part of the key, and segments are lower-cased.

use toml::{Table, Value};
use tracing::warn;

use crate::overrides::set_nested;

/// The prefix derived from a root command name: upper-cased, with `-`
/// replaced by `_` (`my-app` becomes `MY_APP`).
pub fn default_prefix(root_name: &str) -> String {
    root_name.to_uppercase().replace('-', "_")
}

/// Build a table from variables matching `{prefix}__*`.
///
/// Variables are applied in name order so the result does not depend on the
/// iteration order of `vars`. A variable whose path runs through a value set
/// by another variable is dropped with a warning.
pub fn env_to_table(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Table {
    let needle = format!("{prefix}__");
    let mut matching: Vec<(String, String)> = vars
        .into_iter()
        .filter_map(|(name, value)| {
            let rest = name.strip_prefix(&needle)?;
            let key = env_key(rest)?;
            Some((key, value))
        })
        .collect();
    matching.sort();

    let mut table = Table::new();
    for (key, value) in matching {
        if let Err(e) = set_nested(&mut table, &key, parse_env_value(&value)) {
            warn!(key = %key, error = %e, "ignoring environment variable");
        }
    }
    table
}

/// `DATABASE__POOL_SIZE` -> `database.pool_size`. Empty segments reject the
/// whole name.
fn env_key(rest: &str) -> Option<String> {
    let segments: Vec<String> = rest.split("__").map(str::to_lowercase).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segments.join("."))
}

/// Parse an env var value into a typed TOML value.
/// Tries: bool → integer → float → string.
pub(crate) fn parse_env_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    // Require a dot so "NaN" and "inf" stay strings.
    if s.contains('.')
        && let Ok(f) = s.parse::<f64>()
    {
        return Value::Float(f);
    }
    Value::String(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn prefix_from_root_name() {
        assert_eq!(default_prefix("myapp"), "MYAPP");
        assert_eq!(default_prefix("my-app"), "MY_APP");
    }

    #[test]
    fn nested_key_with_literal_underscore() {
        let table = env_to_table(
            "APP",
            vars(&[
                ("APP__HOST", "0.0.0.0"),
                ("APP__DATABASE__POOL_SIZE", "20"),
                ("APP__DATABASE__URL", "pg://"),
            ]),
        );
        assert_eq!(table["host"].as_str().unwrap(), "0.0.0.0");
        assert_eq!(table["database"]["pool_size"].as_integer().unwrap(), 20);
        assert_eq!(table["database"]["url"].as_str().unwrap(), "pg://");
    }

    #[test]
    fn typed_values() {
        let table = env_to_table(
            "APP",
            vars(&[
                ("APP__DEBUG", "TRUE"),
                ("APP__QUIET", "false"),
                ("APP__OFFSET", "-5"),
                ("APP__RATE", "1.5"),
                ("APP__LIMIT", "inf"),
                ("APP__NAME", "hello world"),
            ]),
        );
        assert!(table["debug"].as_bool().unwrap());
        assert!(!table["quiet"].as_bool().unwrap());
        assert_eq!(table["offset"].as_integer().unwrap(), -5);
        assert_eq!(table["rate"].as_float().unwrap(), 1.5);
        assert_eq!(table["limit"].as_str().unwrap(), "inf");
        assert_eq!(table["name"].as_str().unwrap(), "hello world");
    }

    #[test]
    fn non_matching_names_ignored() {
        let table = env_to_table(
            "APP",
            vars(&[
                ("OTHER__HOST", "x"),
                ("APP", "x"),
                ("APP__", "x"),
                ("APP_HOST", "x"),
                ("APP__A____B", "x"),
            ]),
        );
        assert!(table.is_empty());
    }

    #[test]
    fn conflicting_paths_keep_the_first_in_name_order() {
        let table = env_to_table(
            "APP",
            vars(&[("APP__DB__PORT", "5432"), ("APP__DB", "flat")]),
        );
        assert_eq!(table["db"].as_str().unwrap(), "flat");
    }
}
