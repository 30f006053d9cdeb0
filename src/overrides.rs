//! Convert dotted-key overrides into a nested `toml::Table`.
//!
//! Each `("database.url", Value)` pair is expanded into the nested table structure
//! needed for deep-merge with other config layers.

use serde::Serialize;
use toml::{Table, Value};

use crate::error::ClapbindError;

/// Insert `value` at `dotted_key`, creating intermediate tables.
///
/// `("database.url", "pg://")` becomes `{database = {url = "pg://"}}`. An
/// existing leaf at the same key is replaced.
pub fn set_nested(table: &mut Table, dotted_key: &str, value: Value) -> Result<(), ClapbindError> {
    let (path, leaf) = match dotted_key.rsplit_once('.') {
        Some((p, l)) => (Some(p), l),
        None => (None, dotted_key),
    };

    let mut current = table;
    if let Some(path) = path {
        for segment in path.split('.') {
            current = current
                .entry(segment)
                .or_insert_with(|| Value::Table(Table::new()))
                .as_table_mut()
                .ok_or_else(|| ClapbindError::MergeError {
                    key: dotted_key.into(),
                    reason: format!("'{segment}' is not a map"),
                })?;
        }
    }

    current.insert(leaf.to_string(), value);
    Ok(())
}

/// Serialize `source` into a table, skipping `None` fields.
///
/// Works with clap-derived structs, maps, or anything implementing `Serialize`
/// whose top level is a struct or map.
pub fn serialized_to_table<S: Serialize>(source: &S) -> Result<Table, ClapbindError> {
    match Value::try_from(source) {
        Ok(Value::Table(table)) => Ok(table),
        Ok(other) => Err(ClapbindError::InvalidValue {
            key: "<overrides>".into(),
            reason: format!("expected a struct or map, found {}", other.type_str()),
        }),
        Err(e) => Err(ClapbindError::InvalidValue {
            key: "<overrides>".into(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn nested(pairs: &[(&str, Value)]) -> Result<Table, ClapbindError> {
        let mut table = Table::new();
        for (key, value) in pairs {
            set_nested(&mut table, key, value.clone())?;
        }
        Ok(table)
    }

    #[test]
    fn flat_key() {
        let table = nested(&[("host", Value::String("0.0.0.0".into()))]).unwrap();
        assert_eq!(table["host"].as_str().unwrap(), "0.0.0.0");
    }

    #[test]
    fn deep_nesting_shares_intermediate_tables() {
        let table = nested(&[
            ("a.b.c", Value::Integer(1)),
            ("a.b.d", Value::Integer(2)),
        ])
        .unwrap();
        assert_eq!(table["a"]["b"]["c"].as_integer().unwrap(), 1);
        assert_eq!(table["a"]["b"]["d"].as_integer().unwrap(), 2);
    }

    #[test]
    fn last_write_wins_for_same_key() {
        let table = nested(&[("port", Value::Integer(3000)), ("port", Value::Integer(5000))])
            .unwrap();
        assert_eq!(table["port"].as_integer().unwrap(), 5000);
    }

    #[test]
    fn path_through_scalar_is_merge_error() {
        let result = nested(&[
            ("port", Value::Integer(3000)),
            ("port.inner", Value::Integer(1)),
        ]);
        assert!(matches!(result, Err(ClapbindError::MergeError { .. })));
    }

    #[derive(Serialize)]
    struct Flags {
        name: Option<String>,
        verbose: u8,
        output: Option<String>,
    }

    #[test]
    fn serialized_source_skips_none() {
        let flags = Flags {
            name: Some("x".into()),
            verbose: 2,
            output: None,
        };
        let table = serialized_to_table(&flags).unwrap();
        assert_eq!(table["name"].as_str().unwrap(), "x");
        assert_eq!(table["verbose"].as_integer().unwrap(), 2);
        assert!(!table.contains_key("output"));
    }

    #[test]
    fn serialized_map_source() {
        let mut map = BTreeMap::new();
        map.insert("color", "blue");
        let table = serialized_to_table(&map).unwrap();
        assert_eq!(table["color"].as_str().unwrap(), "blue");
    }

    #[test]
    fn serialized_scalar_is_rejected() {
        assert!(serialized_to_table(&42).is_err());
    }
}
