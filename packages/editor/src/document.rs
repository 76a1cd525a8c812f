//! # Document Handle
//!
//! The source file a sync session keeps in step with the canvas.
//!
//! A document is either:
//! - **Memory-backed**: no path, patched text is never written
//! - **File-backed**: patched text is written through the Source Writer

use crate::dialect::DialectRegistry;
use crate::SyncError;
use dragndrop_parser::Dialect;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: Option<PathBuf>,
    pub dialect: Dialect,
    pub source: String,
}

impl Document {
    /// Memory-backed document
    pub fn from_source(dialect: Dialect, source: impl Into<String>) -> Self {
        Self {
            path: None,
            dialect,
            source: source.into(),
        }
    }

    /// Read a file, picking the dialect from its extension
    pub async fn load(path: impl AsRef<Path>, registry: &DialectRegistry) -> Result<Self, SyncError> {
        let path = path.as_ref();
        let dialect = registry
            .for_path(path)
            .map(|syntax| syntax.dialect())
            .ok_or_else(|| SyncError::UnknownDialect(path.to_path_buf()))?;
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SyncError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            dialect,
            source,
        })
    }

    pub fn is_file_backed(&self) -> bool {
        self.path.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_picks_dialect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Card.tsx");
        tokio::fs::write(&path, "export const Card = () => <div />;").await.unwrap();

        let document = Document::load(&path, &DialectRegistry::with_defaults()).await.unwrap();
        assert_eq!(document.dialect, Dialect::Tsx);
        assert!(document.is_file_backed());
        assert_eq!(document.source, "export const Card = () => <div />;");
    }

    #[tokio::test]
    async fn test_load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let err = Document::load(&path, &DialectRegistry::with_defaults()).await.unwrap_err();
        assert!(matches!(err, SyncError::UnknownDialect(_)));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Document::load(dir.path().join("gone.html"), &DialectRegistry::with_defaults())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }
}
