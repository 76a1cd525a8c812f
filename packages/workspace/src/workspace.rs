//! # Workspace
//!
//! A project directory: its configuration, the sync environment shared by
//! every opened file, and one watched session per opened file.

use crate::config::{ConfigError, ProjectConfig};
use crate::watcher::{SourceWatcher, WatchError};
use dragndrop_editor::{Document, SyncEnvironment, SyncError, SyncEvents, SyncHandle, SyncSession};
use dragndrop_vdom::LiveTreeMut;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Watch error: {0}")]
    Watch(#[from] WatchError),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),
}

pub struct Workspace {
    root: PathBuf,
    config: ProjectConfig,
    env: Arc<SyncEnvironment>,
}

/// A file opened for visual editing
pub struct OpenFile {
    pub path: PathBuf,
    pub handle: SyncHandle,
    pub events: SyncEvents,
    watcher: Option<SourceWatcher>,
}

impl OpenFile {
    pub fn is_watched(&self) -> bool {
        self.watcher.is_some()
    }

    /// Stop watching and end the session
    pub fn close(self) {
        self.handle.close();
    }
}

impl Workspace {
    /// Workspace rooted at `root`, configured from its config files
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, WorkspaceError> {
        let root = root.into();
        let config = ProjectConfig::load(&root)?;
        Ok(Self::with_config(root, config))
    }

    pub fn with_config(root: impl Into<PathBuf>, config: ProjectConfig) -> Self {
        let env = Arc::new(config.environment());
        Self {
            root: root.into(),
            config,
            env,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn environment(&self) -> &Arc<SyncEnvironment> {
        &self.env
    }

    /// Open `path` (relative to the root or absolute) for sync with `live`
    pub async fn open<L>(&self, path: impl AsRef<Path>, live: Arc<Mutex<L>>) -> Result<OpenFile, WorkspaceError>
    where
        L: LiveTreeMut + Send + 'static,
    {
        let path = self.root.join(path);
        let document = Document::load(&path, &self.env.registry).await?;
        let dialect = document.dialect;
        let (handle, events) = SyncSession::open(document, live, Arc::clone(&self.env)).await?;

        let watcher = if self.config.watch {
            Some(SourceWatcher::spawn(&path, handle.clone())?)
        } else {
            None
        };
        info!(path = %path.display(), %dialect, watched = watcher.is_some(), "Opened file");

        Ok(OpenFile {
            path,
            handle,
            events,
            watcher,
        })
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("root", &self.root)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
