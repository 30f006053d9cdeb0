//! Per-command setup stages run before dispatch.
//!
//! Stages are registered against a command path when the command tree is
//! built. For an invocation, every stage registered on the invoked command
//! or one of its ancestors runs, root first:
//!
//! ```
//! use clapbind::{ConfigStore, SetupPipeline};
//!
//! let mut pipeline = SetupPipeline::new()
//!     .stage(&[], |store| Ok(store.set("ran.root", true)?))
//!     .stage(&["serve"], |store| Ok(store.set("ran.serve", true)?))
//!     .stage(&["build"], |store| Ok(store.set("ran.build", true)?));
//!
//! let mut store = ConfigStore::new();
//! pipeline.run(&["serve"], &mut store).unwrap();
//! assert!(store.contains("ran.root") && store.contains("ran.serve"));
//! assert!(!store.contains("ran.build"));
//! ```

use tracing::debug;

use crate::error::{BoxError, ClapbindError};
use crate::store::ConfigStore;

type StageFn = Box<dyn FnMut(&mut ConfigStore) -> Result<(), BoxError>>;

struct Stage {
    path: Vec<String>,
    run: StageFn,
}

#[derive(Default)]
pub struct SetupPipeline {
    stages: Vec<Stage>,
}

impl SetupPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `setup` for the command at `path` (child names below the
    /// root; empty for the root itself).
    pub fn stage<F>(mut self, path: &[&str], setup: F) -> Self
    where
        F: FnMut(&mut ConfigStore) -> Result<(), BoxError> + 'static,
    {
        self.stages.push(Stage {
            path: path.iter().map(|s| s.to_string()).collect(),
            run: Box::new(setup),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage on the ancestor chain of `invoked_path`. Shallower
    /// stages run first; stages at the same depth run in registration order.
    /// Stops at the first failure. Returns the number of stages run.
    pub fn run(
        &mut self,
        invoked_path: &[&str],
        store: &mut ConfigStore,
    ) -> Result<usize, ClapbindError> {
        let mut selected: Vec<&mut Stage> = self
            .stages
            .iter_mut()
            .filter(|s| is_prefix(&s.path, invoked_path))
            .collect();
        selected.sort_by_key(|s| s.path.len());

        let count = selected.len();
        for stage in selected {
            let command = stage.path.join(" ");
            debug!(command = %command, "running setup stage");
            (stage.run)(store).map_err(|source| ClapbindError::Setup { command, source })?;
        }
        Ok(count)
    }
}

impl std::fmt::Debug for SetupPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|s| &s.path))
            .finish()
    }
}

fn is_prefix(prefix: &[String], path: &[&str]) -> bool {
    prefix.len() <= path.len() && prefix.iter().zip(path).all(|(a, b)| a == b)
}
