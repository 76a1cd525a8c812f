//! Error types for the sync engine

use crate::formatter::FormatError;
use crate::writer::WriteError;
use dragndrop_parser::ParseError;
use dragndrop_vdom::{DiffError, PatchError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Diff error: {0}")]
    Diff(#[from] DiffError),

    #[error("Patch error: {0}")]
    Patch(#[from] PatchError),

    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("No dialect for {}", .0.display())]
    UnknownDialect(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Sync session is closed")]
    SessionClosed,
}
