//! Error types for Guideflow.
//!
//! All errors in Guideflow are represented by the `GuideflowError` enum.
//! Configuration and dispatcher errors propagate to the immediate caller,
//! while action errors are absorbed into the reply payload by the workers.

use std::io::ErrorKind;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Guideflow operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum GuideflowError {
    /// Configuration file parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// The tree repository could not produce a tree for a workflow.
    #[error("failed to configure workflow '{workflow_id}': {reason}")]
    Configuration {
        workflow_id: String,
        reason: String,
    },

    /// A node references a parent that is not in the tree.
    #[error("node '{id}' references unknown parent '{parent}'")]
    OrphanNode {
        id: String,
        parent: String,
    },

    /// A node id is already present in the tree.
    #[error("node '{0}' already exists in the tree")]
    DuplicateNode(String),

    /// A second root was inserted.
    #[error("cannot insert root '{id}', tree already has root '{root}'")]
    RootExists {
        id: String,
        root: String,
    },

    /// A dialog definition without nodes.
    #[error("dialog '{0}' has no nodes")]
    EmptyTree(String),

    /// Action execution errors.
    #[error("{0}")]
    Action(String),

    /// Submission attempted after the dispatcher was shut down.
    #[error("action dispatcher is closed")]
    DispatcherClosed,

    /// A message reached an engine that was never configured.
    #[error("engine is not ready")]
    NotReady,

    /// The reply destination is gone.
    #[error("{0}")]
    Reply(String),

    /// Data conversion errors (JSON, TOML).
    #[error("{0}")]
    Convert(String),

    /// Tree repository errors.
    #[error("{0}")]
    Store(String),

    /// Message queue errors.
    #[error("{0}")]
    Queue(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),
}

impl From<GuideflowError> for String {
    fn from(val: GuideflowError) -> Self {
        val.to_string()
    }
}

impl From<std::io::Error> for GuideflowError {
    fn from(error: std::io::Error) -> Self {
        GuideflowError::IoError(error.to_string())
    }
}

impl From<GuideflowError> for std::io::Error {
    fn from(val: GuideflowError) -> Self {
        #[allow(clippy::io_other_error)]
        std::io::Error::new(ErrorKind::Other, val.to_string())
    }
}

impl From<serde_json::Error> for GuideflowError {
    fn from(error: serde_json::Error) -> Self {
        GuideflowError::Convert(error.to_string())
    }
}

impl From<toml::de::Error> for GuideflowError {
    fn from(error: toml::de::Error) -> Self {
        GuideflowError::Convert(error.to_string())
    }
}

impl From<toml::ser::Error> for GuideflowError {
    fn from(error: toml::ser::Error) -> Self {
        GuideflowError::Convert(error.to_string())
    }
}
