//! Deterministic ordering of dotted config keys, and the human-readable dump
//! built on it.
//!
//! Bare top-level keys come first, then each group with its members kept
//! contiguous and sorted:
//!
//! ```text
//! Config values:
//!     port: 8080
//!     quiet: false
//!     db.host: localhost
//!     db.port: 5432
//! ```

use std::cmp::Ordering;
use std::collections::HashSet;

use toml::Value;

use crate::store::ConfigStore;

/// Compare two dotted keys segment by segment.
///
/// A key that ends at the current segment sorts before one that continues
/// deeper; otherwise segments compare lexicographically and ties recurse
/// into the remainder.
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    let a: Vec<&str> = a.split('.').collect();
    let b: Vec<&str> = b.split('.').collect();
    compare_segments(&a, &b)
}

fn compare_segments(a: &[&str], b: &[&str]) -> Ordering {
    match (a.split_first(), b.split_first()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some((a_head, a_rest)), Some((b_head, b_rest))) => {
            match (a_rest.is_empty(), b_rest.is_empty()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (true, true) => a_head.cmp(b_head),
                (false, false) => a_head
                    .cmp(b_head)
                    .then_with(|| compare_segments(a_rest, b_rest)),
            }
        }
    }
}

/// Sort keys for display. A key that is a strict dotted prefix of another key
/// in `keys` is a group key: it sorts as if followed by an empty segment, so
/// it lands after the bare keys at its level and just before its members.
pub fn sort_keys(keys: &mut [String]) {
    let groups: HashSet<String> = keys
        .iter()
        .flat_map(|k| k.match_indices('.').map(move |(i, _)| k[..i].to_string()))
        .collect();

    keys.sort_by_cached_key(|k| {
        let mut segments: Vec<String> = k.split('.').map(str::to_string).collect();
        if groups.contains(k) {
            segments.push(String::new());
        }
        SortKey(segments)
    });
}

#[derive(PartialEq, Eq)]
struct SortKey(Vec<String>);

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let a: Vec<&str> = self.0.iter().map(String::as_str).collect();
        let b: Vec<&str> = other.0.iter().map(String::as_str).collect();
        compare_segments(&a, &b)
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Render every resolved key as `key: value`, one per line, in display order.
pub fn debug_dump(store: &ConfigStore) -> String {
    let mut keys = store.all_keys();
    sort_keys(&mut keys);

    let mut out = String::from("Config values:\n");
    for key in keys {
        let value = store.get(&key).map(format_value).unwrap_or_default();
        out.push_str(&format!("\t{key}: {value}\n"));
    }
    out
}

/// Format a TOML value for display.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(d) => d.to_string(),
        Value::Array(_) | Value::Table(_) => value.to_string(),
    }
}
