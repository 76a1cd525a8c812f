use crate::operations::NodePath;
use dragndrop_parser::ParseError;
use thiserror::Error;

/// Internal inconsistency between a tree and the operations meant for it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiffError {
    #[error("Path {path} does not resolve: {reason}")]
    UnresolvedPath { path: NodePath, reason: String },

    #[error("Trees still differ after a sync cycle ({operations} pending operations)")]
    Diverged { operations: usize },
}

impl DiffError {
    pub fn unresolved(path: &NodePath, reason: impl Into<String>) -> Self {
        DiffError::UnresolvedPath {
            path: path.clone(),
            reason: reason.into(),
        }
    }
}

/// Failure to apply operations to a concrete target
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("Unsupported construct at {path}: {reason}")]
    Unsupported { path: NodePath, reason: String },

    #[error("Path {0} does not resolve in the patch target")]
    UnresolvedPath(NodePath),

    #[error("Invalid edit {start}..{end}: {reason}")]
    InvalidEdit {
        start: usize,
        end: usize,
        reason: String,
    },

    #[error("Live tree error: {0}")]
    Live(String),

    #[error("Source to patch does not parse: {0}")]
    Source(#[from] ParseError),
}

impl PatchError {
    pub fn unsupported(path: &NodePath, reason: impl Into<String>) -> Self {
        PatchError::Unsupported {
            path: path.clone(),
            reason: reason.into(),
        }
    }
}

impl From<DiffError> for PatchError {
    fn from(error: DiffError) -> Self {
        match error {
            DiffError::UnresolvedPath { path, .. } => PatchError::UnresolvedPath(path),
            DiffError::Diverged { .. } => PatchError::Live(error.to_string()),
        }
    }
}
