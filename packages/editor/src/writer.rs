//! # Source Writer
//!
//! Persists patched text to disk. Writes to the same path are serialized;
//! the previous file content can be kept in a `.backup` sibling and
//! restored.

use crate::dialect::{DialectRegistry, FormatOptions};
use crate::formatter::{format_checked, Formatter};
use dragndrop_parser::{Dialect, Node};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No backup exists for {}", .0.display())]
    NoBackup(PathBuf),

    #[error("No dialect registered for {0}")]
    UnknownDialect(Dialect),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Copy the current file to `<path>.backup` before overwriting it
    pub backup: bool,
    /// Run the formatter over text serialized by [`SourceWriter::write`]
    pub format: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            backup: true,
            format: true,
        }
    }
}

/// `<path>.backup`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".backup");
    PathBuf::from(name)
}

pub struct SourceWriter {
    registry: DialectRegistry,
    formatter: Arc<dyn Formatter>,
    format_options: FormatOptions,
    locks: StdMutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl SourceWriter {
    pub fn new(registry: DialectRegistry, formatter: Arc<dyn Formatter>, format_options: FormatOptions) -> Self {
        Self {
            registry,
            formatter,
            format_options,
            locks: StdMutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, path: &Path) -> PathLock<'_> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        PathLock {
            locks: &self.locks,
            path: path.to_path_buf(),
            lock: Arc::clone(locks.entry(path.to_path_buf()).or_default()),
        }
    }

    /// Serialize `tree` for `dialect`, format it and write it to `path`
    pub async fn write(
        &self,
        path: &Path,
        dialect: Dialect,
        tree: &Node,
        options: WriteOptions,
    ) -> Result<(), WriteError> {
        let syntax = self
            .registry
            .get(dialect)
            .ok_or(WriteError::UnknownDialect(dialect))?;
        let mut text = syntax.serialize(tree, &self.format_options);

        if options.format {
            match format_checked(self.formatter.as_ref(), &text, dialect, &self.format_options) {
                Ok(formatted) => text = formatted,
                Err(error) => warn!(%error, path = %path.display(), "Formatting failed, writing unformatted text"),
            }
        }
        self.write_text(path, &text, options).await
    }

    /// Write already-patched text to `path`
    pub async fn write_text(&self, path: &Path, text: &str, options: WriteOptions) -> Result<(), WriteError> {
        let entry = self.lock_for(path);
        let _guard = entry.lock.lock().await;

        if options.backup && tokio::fs::try_exists(path).await.unwrap_or(false) {
            let backup = backup_path(path);
            if let Err(error) = tokio::fs::copy(path, &backup).await {
                warn!(%error, path = %backup.display(), "Failed to write backup");
            }
        }

        tokio::fs::write(path, text).await.map_err(|source| WriteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = text.len(), "Wrote source");
        Ok(())
    }

    /// Undo the last write to `path` from its backup, removing the backup
    pub async fn restore_backup(&self, path: &Path) -> Result<(), WriteError> {
        let entry = self.lock_for(path);
        let _guard = entry.lock.lock().await;

        let backup = backup_path(path);
        if !tokio::fs::try_exists(&backup).await.unwrap_or(false) {
            return Err(WriteError::NoBackup(path.to_path_buf()));
        }
        let io = |source| WriteError::Io {
            path: path.to_path_buf(),
            source,
        };
        tokio::fs::copy(&backup, path).await.map_err(io)?;
        tokio::fs::remove_file(&backup).await.map_err(io)?;
        debug!(path = %path.display(), "Restored backup");
        Ok(())
    }
}

impl std::fmt::Debug for SourceWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceWriter")
            .field("registry", &self.registry)
            .field("format_options", &self.format_options)
            .finish_non_exhaustive()
    }
}

/// A path's write lock, taken out of the lock map. The path leaves the map
/// once no writer holds or waits on its lock.
struct PathLock<'w> {
    locks: &'w StdMutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl Drop for PathLock<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // the map and this entry are the only owners
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::MarkupFormatter;

    fn writer() -> SourceWriter {
        SourceWriter::new(
            DialectRegistry::with_defaults(),
            Arc::new(MarkupFormatter),
            FormatOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_write_keeps_backup_and_restores() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        tokio::fs::write(&path, "<p>old</p>\n").await.unwrap();

        let tree = Node::element("p").with_child(Node::text("new"));
        writer()
            .write(&path, Dialect::Html, &tree, WriteOptions::default())
            .await
            .unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "<p>new</p>\n");
        assert_eq!(
            tokio::fs::read_to_string(backup_path(&path)).await.unwrap(),
            "<p>old</p>\n"
        );

        writer().restore_backup(&path).await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "<p>old</p>\n");
        assert!(!backup_path(&path).exists());
    }

    #[tokio::test]
    async fn test_lock_map_is_pruned() {
        let dir = tempfile::tempdir().unwrap();
        let writer = Arc::new(writer());
        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let writer = Arc::clone(&writer);
                let path = dir.path().join(format!("page{}.html", i % 2));
                tokio::spawn(async move {
                    writer
                        .write_text(&path, &format!("<p>{i}</p>\n"), WriteOptions::default())
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        writer.restore_backup(&dir.path().join("page0.html")).await.unwrap();

        assert!(writer.locks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restore_without_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("App.jsx");
        let err = writer().restore_backup(&path).await.unwrap_err();
        assert!(matches!(err, WriteError::NoBackup(p) if p == path));
    }

    #[tokio::test]
    async fn test_write_without_backup_or_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.html");
        let options = WriteOptions {
            backup: false,
            format: false,
        };
        writer().write_text(&path, "<div></div>", options).await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "<div></div>");
        assert!(!backup_path(&path).exists());
    }

    #[tokio::test]
    async fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("page.html");
        let err = writer()
            .write_text(&path, "<p></p>", WriteOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WriteError::Io { .. }));
    }

    #[test]
    fn test_backup_path() {
        assert_eq!(backup_path(Path::new("src/App.vue")), PathBuf::from("src/App.vue.backup"));
    }
}
