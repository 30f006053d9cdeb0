//! Read a single config document into a `toml::Table`.
//!
//! TOML parses straight into a table. JSON and YAML are parsed into a
//! `serde_json::Value` first and then converted, dropping `null` entries
//! since TOML has no way to represent them.

use std::path::Path;

use toml::{Table, Value};

use crate::error::{BoxError, ClapbindError};
use crate::fs::FileSystem;
use crate::types::Format;

/// Read and parse the config file at `path`, detecting the format from its
/// extension.
pub fn read_source(fs: &dyn FileSystem, path: &Path) -> Result<Table, ClapbindError> {
    let format = Format::from_path(path).ok_or_else(|| ClapbindError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    let content = match fs.read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ClapbindError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(ClapbindError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    parse_source(&content, format).map_err(|source| ClapbindError::ParseError {
        path: path.to_path_buf(),
        format,
        source,
    })
}

/// Parse document text in the given format.
pub fn parse_source(content: &str, format: Format) -> Result<Table, BoxError> {
    match format {
        Format::Toml => Ok(toml::from_str::<Table>(content)?),
        Format::Json => {
            let value: serde_json::Value = serde_json::from_str(content)?;
            json_root_to_table(value)
        }
        Format::Yaml | Format::Yml => {
            if content.trim().is_empty() {
                return Ok(Table::new());
            }
            let value: serde_json::Value = serde_yaml::from_str(content)?;
            json_root_to_table(value)
        }
    }
}

fn json_root_to_table(value: serde_json::Value) -> Result<Table, BoxError> {
    match value {
        serde_json::Value::Object(map) => Ok(object_to_table(map)),
        serde_json::Value::Null => Ok(Table::new()),
        other => Err(format!("document root must be a map, found {}", kind(&other)).into()),
    }
}

fn object_to_table(map: serde_json::Map<String, serde_json::Value>) -> Table {
    map.into_iter()
        .filter_map(|(k, v)| json_to_toml(v).map(|v| (k, v)))
        .collect()
}

/// Convert a JSON value into a TOML value. `null` has no TOML counterpart
/// and converts to `None`; nulls inside arrays are dropped.
pub(crate) fn json_to_toml(value: serde_json::Value) -> Option<Value> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(Value::Boolean(b)),
        serde_json::Value::Number(n) => Some(match n.as_i64() {
            Some(i) => Value::Integer(i),
            // u64 beyond i64::MAX and real floats both land here.
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        }),
        serde_json::Value::String(s) => Some(Value::String(s)),
        serde_json::Value::Array(items) => Some(Value::Array(
            items.into_iter().filter_map(json_to_toml).collect(),
        )),
        serde_json::Value::Object(map) => Some(Value::Table(object_to_table(map))),
    }
}

fn kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "a map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFs;

    #[test]
    fn reads_json() {
        let fs = MemoryFs::new().with_file("/c.json", r#"{"port": 80, "db": {"host": "x"}}"#);
        let table = read_source(&fs, Path::new("/c.json")).unwrap();
        assert_eq!(table["port"].as_integer(), Some(80));
        assert_eq!(table["db"]["host"].as_str(), Some("x"));
    }

    #[test]
    fn reads_toml() {
        let fs = MemoryFs::new().with_file("/c.toml", "port = 80\n[db]\nhost = \"x\"\n");
        let table = read_source(&fs, Path::new("/c.toml")).unwrap();
        assert_eq!(table["port"].as_integer(), Some(80));
        assert_eq!(table["db"]["host"].as_str(), Some("x"));
    }

    #[test]
    fn reads_yaml_and_yml() {
        let fs = MemoryFs::new()
            .with_file("/c.yaml", "port: 80\ndb:\n  host: x\n")
            .with_file("/c.yml", "ratio: 0.5\ntags: [a, b]\n");
        let yaml = read_source(&fs, Path::new("/c.yaml")).unwrap();
        assert_eq!(yaml["db"]["host"].as_str(), Some("x"));
        let yml = read_source(&fs, Path::new("/c.yml")).unwrap();
        assert_eq!(yml["ratio"].as_float(), Some(0.5));
        assert_eq!(yml["tags"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn preserves_nested_key_casing() {
        let fs = MemoryFs::new().with_file("/c.yaml", "Server:\n  MaxConn: 5\n");
        let table = read_source(&fs, Path::new("/c.yaml")).unwrap();
        assert_eq!(table["Server"]["MaxConn"].as_integer(), Some(5));
    }

    #[test]
    fn nulls_are_dropped() {
        let fs = MemoryFs::new().with_file("/c.json", r#"{"a": null, "b": [1, null, 2]}"#);
        let table = read_source(&fs, Path::new("/c.json")).unwrap();
        assert!(!table.contains_key("a"));
        assert_eq!(table["b"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn empty_yaml_is_empty_table() {
        let fs = MemoryFs::new().with_file("/c.yaml", "");
        assert!(read_source(&fs, Path::new("/c.yaml")).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_not_found() {
        let fs = MemoryFs::new();
        let err = read_source(&fs, Path::new("/missing.json")).unwrap_err();
        assert!(matches!(err, ClapbindError::NotFound { .. }));
    }

    #[test]
    fn malformed_content_is_parse_error() {
        let fs = MemoryFs::new()
            .with_file("/bad.json", "{ not json")
            .with_file("/bad.toml", "port = = 1")
            .with_file("/bad.yaml", "a: [unclosed");
        for p in ["/bad.json", "/bad.toml", "/bad.yaml"] {
            let err = read_source(&fs, Path::new(p)).unwrap_err();
            assert!(
                matches!(err, ClapbindError::ParseError { .. }),
                "{p}: expected ParseError, got {err:?}"
            );
        }
    }

    #[test]
    fn scalar_root_is_parse_error() {
        let fs = MemoryFs::new().with_file("/c.json", "42");
        let err = read_source(&fs, Path::new("/c.json")).unwrap_err();
        assert!(matches!(err, ClapbindError::ParseError { format: Format::Json, .. }));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let fs = MemoryFs::new().with_file("/c.ini", "a=1");
        let err = read_source(&fs, Path::new("/c.ini")).unwrap_err();
        assert!(matches!(err, ClapbindError::UnsupportedFormat { .. }));
    }
}
