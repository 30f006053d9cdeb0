use toml::{Table, Value};

use crate::error::ClapbindError;

/// Deep-merge `overlay` on top of `base`.
/// If both sides have a Table for the same key, recurse.
/// A Table on one side and anything else on the other is a `MergeError`.
/// Otherwise, `overlay`'s value wins.
pub fn try_merge(base: Table, overlay: Table) -> Result<Table, ClapbindError> {
    merge_at(base, overlay, "")
}

fn merge_at(mut base: Table, overlay: Table, prefix: &str) -> Result<Table, ClapbindError> {
    for (key, overlay_val) in overlay {
        let dotted = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match (base.remove(&key), overlay_val) {
            (Some(Value::Table(base_tbl)), Value::Table(overlay_tbl)) => {
                base.insert(key, Value::Table(merge_at(base_tbl, overlay_tbl, &dotted)?));
            }
            (Some(Value::Table(_)), other) => {
                return Err(ClapbindError::MergeError {
                    key: dotted,
                    reason: format!("cannot replace a map with {}", other.type_str()),
                });
            }
            (Some(existing), Value::Table(_)) => {
                return Err(ClapbindError::MergeError {
                    key: dotted,
                    reason: format!("cannot replace {} with a map", existing.type_str()),
                });
            }
            (_, overlay_val) => {
                base.insert(key, overlay_val);
            }
        }
    }
    Ok(base)
}

/// Merge `overlay` under `base`: keys already present in `base` are kept,
/// tables are combined recursively. Structural conflicts resolve in favor of
/// `base`.
pub fn merge_under(mut base: Table, overlay: Table) -> Table {
    for (key, overlay_val) in overlay {
        match (base.remove(&key), overlay_val) {
            (Some(Value::Table(base_tbl)), Value::Table(overlay_tbl)) => {
                base.insert(key, Value::Table(merge_under(base_tbl, overlay_tbl)));
            }
            (Some(existing), _) => {
                base.insert(key, existing);
            }
            (None, overlay_val) => {
                base.insert(key, overlay_val);
            }
        }
    }
    base
}
