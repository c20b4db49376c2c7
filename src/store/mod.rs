//! Tree repositories.
//!
//! The engine only needs `get_tree`. Where the tree comes from is up to the
//! backend:
//! - `MemStore`: in-memory, trees deployed at runtime (tests, fixtures)
//! - `FileStore`: dialog definitions read from a directory of JSON/TOML files

mod file;
mod mem;

use std::sync::Arc;

use crate::{GuideflowError, Result, dialog::DialogTree, model::DialogModel};

pub use file::FileStore;
pub use mem::MemStore;

/// Source of immutable dialog trees, keyed by workflow id.
pub trait TreeRepository: Send + Sync {
    /// Returns the tree of `workflow_id`, built once and shared.
    ///
    /// Unknown workflows and broken definitions are reported as
    /// [`GuideflowError::Configuration`].
    fn get_tree(
        &self,
        workflow_id: &str,
    ) -> Result<Arc<DialogTree>>;

    /// Stores a definition. Returns `true` when the workflow is new and
    /// `false` when it replaced an existing one.
    fn deploy(
        &self,
        model: DialogModel,
    ) -> Result<bool>;
}

/// Maps a backend failure to a configuration error for `workflow_id`.
fn configuration_err(
    workflow_id: &str,
    reason: impl ToString,
) -> GuideflowError {
    GuideflowError::Configuration {
        workflow_id: workflow_id.to_string(),
        reason: reason.to_string(),
    }
}
