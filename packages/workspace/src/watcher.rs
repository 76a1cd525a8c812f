use dragndrop_editor::SyncHandle;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to create watcher: {0}")]
    Create(#[from] notify::Error),

    #[error("{} has no parent directory to watch", .0.display())]
    NoParent(PathBuf),
}

pub type WatchResult<T> = Result<T, WatchError>;

/// Backups, editor swap files and dot-files
pub fn is_ignored(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Forwards edits of one opened file to its sync session
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl SourceWatcher {
    /// Watch `path` and call `on_source_changed` with the new text whenever
    /// it is modified
    pub fn spawn(path: &Path, handle: SyncHandle) -> WatchResult<Self> {
        let directory = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| WatchError::NoParent(path.to_path_buf()))?;
        let file_name = path
            .file_name()
            .map(OsString::from)
            .ok_or_else(|| WatchError::NoParent(path.to_path_buf()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;
        watcher.watch(directory, RecursiveMode::NonRecursive)?;

        let task = tokio::spawn(forward(path.to_path_buf(), file_name, rx, handle));
        debug!(path = %path.display(), "Watching source file");
        Ok(Self {
            _watcher: watcher,
            task,
        })
    }
}

impl Drop for SourceWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn forward(
    path: PathBuf,
    file_name: OsString,
    mut events: mpsc::UnboundedReceiver<notify::Result<Event>>,
    handle: SyncHandle,
) {
    while let Some(result) = events.recv().await {
        let event = match result {
            Ok(event) => event,
            Err(error) => {
                warn!(%error, "File watcher error");
                continue;
            }
        };
        if !touches(&event, &file_name) {
            continue;
        }

        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                if handle.on_source_changed(text).is_err() {
                    break;
                }
            }
            // deleted or mid-rename; the next event carries the content
            Err(error) => debug!(%error, path = %path.display(), "Could not read changed file"),
        }
    }
}

fn touches(event: &Event, file_name: &OsString) -> bool {
    let relevant = match &event.kind {
        EventKind::Create(_) => true,
        EventKind::Modify(modify) => !matches!(modify, notify::event::ModifyKind::Metadata(_)),
        _ => false,
    };
    relevant
        && event.paths.iter().any(|p| {
            !is_ignored(p) && p.file_name().is_some_and(|name| name == file_name.as_os_str())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind, ModifyKind};

    #[test]
    fn test_ignored_files() {
        assert!(is_ignored(Path::new("src/index.html.backup")));
        assert!(is_ignored(Path::new("src/.index.html.swp")));
        assert!(is_ignored(Path::new("src/index.html~")));
        assert!(!is_ignored(Path::new("src/index.html")));
    }

    #[test]
    fn test_touches_only_the_opened_file() {
        let name = OsString::from("index.html");
        let event = |kind, path: &str| Event::new(kind).add_path(PathBuf::from(path));

        assert!(touches(
            &event(EventKind::Modify(ModifyKind::Data(DataChange::Content)), "/site/index.html"),
            &name
        ));
        assert!(touches(&event(EventKind::Create(CreateKind::File), "/site/index.html"), &name));
        assert!(!touches(
            &event(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)), "/site/index.html"),
            &name
        ));
        assert!(!touches(
            &event(EventKind::Modify(ModifyKind::Any), "/site/index.html.backup"),
            &name
        ));
        assert!(!touches(&event(EventKind::Modify(ModifyKind::Any), "/site/about.html"), &name));
    }
}
