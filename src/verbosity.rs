//! Map `--verbose` / `--quiet` into a log severity.
//!
//! The count is signed: `-1` when quiet, otherwise the number of `-v` flags.
//! The severity runs the other way, lower is chattier:
//!
//! | count | severity | level  |
//! |-------|----------|--------|
//! | -1    | 12       | off    |
//! | 0     | 8        | error  |
//! | 1     | 4        | warn   |
//! | 2     | 0        | info   |
//! | 3     | -4       | debug  |
//! | 4+    | <= -8    | trace  |

use tracing::level_filters::LevelFilter;

use crate::store::ConfigStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbosityOptions {
    pub quiet_key: String,
    pub verbose_key: String,
    /// Severity at count zero.
    pub zero_level: i64,
    /// Severity change per count.
    pub step: i64,
}

impl Default for VerbosityOptions {
    fn default() -> Self {
        Self {
            quiet_key: "quiet".into(),
            verbose_key: "verbose".into(),
            zero_level: 8,
            step: 4,
        }
    }
}

/// `-1` when the quiet key is true, otherwise the verbose count (0 if unset).
pub fn verbosity_count(store: &ConfigStore, options: &VerbosityOptions) -> i64 {
    if store.get_bool(&options.quiet_key).unwrap_or(false) {
        return -1;
    }
    store.get_i64(&options.verbose_key).unwrap_or(0)
}

/// Severity for the current count. Saturates instead of overflowing on
/// absurd counts.
pub fn verbosity_level(store: &ConfigStore, options: &VerbosityOptions) -> i64 {
    let delta = options.step.saturating_mul(verbosity_count(store, options));
    options.zero_level.saturating_sub(delta)
}

pub fn level_filter(severity: i64) -> LevelFilter {
    match severity {
        i64::MIN..=-8 => LevelFilter::TRACE,
        -7..=-4 => LevelFilter::DEBUG,
        -3..=0 => LevelFilter::INFO,
        1..=4 => LevelFilter::WARN,
        5..=8 => LevelFilter::ERROR,
        _ => LevelFilter::OFF,
    }
}
