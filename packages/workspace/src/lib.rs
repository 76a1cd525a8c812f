pub mod config;
pub mod watcher;
pub mod workspace;

pub use config::{ConfigError, ProjectConfig, DEFAULT_CONFIG_NAME, PRETTIER_CONFIG_NAME};
pub use watcher::{is_ignored, SourceWatcher, WatchError, WatchResult};
pub use workspace::{OpenFile, Workspace, WorkspaceError};
