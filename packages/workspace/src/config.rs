use dragndrop_editor::{FormatOptions, QuoteStyle, SyncEnvironment, WriteOptions};
use dragndrop_vdom::ArtifactFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_NAME: &str = "dragndrop.config.json";
pub const PRETTIER_CONFIG_NAME: &str = ".prettierrc";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Project configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    /// Quiet period before a change is synced
    pub debounce_ms: u64,
    /// Cycles slower than this are logged
    pub latency_budget_ms: u64,
    /// Keep a `.backup` copy of each file before overwriting it
    pub backup: bool,
    pub format: FormatOptions,
    pub artifacts: ArtifactFilter,
    /// Sync edits made to opened files outside the editor
    pub watch: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            latency_budget_ms: 100,
            backup: true,
            // the formatting used when a project has no `.prettierrc`
            format: FormatOptions {
                quote: QuoteStyle::Single,
                ..FormatOptions::default()
            },
            artifacts: ArtifactFilter::default(),
            watch: true,
        }
    }
}

/// The `.prettierrc` keys that map onto [`FormatOptions`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrettierConfig {
    tab_width: Option<usize>,
    use_tabs: Option<bool>,
    single_quote: Option<bool>,
}

impl PrettierConfig {
    fn apply_to(&self, format: &mut FormatOptions) {
        if let Some(width) = self.tab_width {
            format.indent_width = width;
        }
        if let Some(tabs) = self.use_tabs {
            format.use_tabs = tabs;
        }
        // prettier's own default applies once a `.prettierrc` exists
        format.quote = if self.single_quote.unwrap_or(false) {
            QuoteStyle::Single
        } else {
            QuoteStyle::Double
        };
    }
}

impl ProjectConfig {
    /// Load config from a project root. Missing files mean defaults;
    /// `.prettierrc` overrides the format keys it sets.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config: ProjectConfig = read_json(&root.join(DEFAULT_CONFIG_NAME))?.unwrap_or_default();
        if let Some(prettier) = read_json::<PrettierConfig>(&root.join(PRETTIER_CONFIG_NAME))? {
            prettier.apply_to(&mut config.format);
        }
        Ok(config)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn latency_budget(&self) -> Duration {
        Duration::from_millis(self.latency_budget_ms)
    }

    /// Sync environment for sessions of this project
    pub fn environment(&self) -> SyncEnvironment {
        SyncEnvironment::new(self.format.clone())
            .with_debounce(self.debounce())
            .with_latency_budget(self.latency_budget())
            .with_filter(self.artifacts.clone())
            .with_write_options(WriteOptions {
                backup: self.backup,
                ..WriteOptions::default()
            })
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "debounceMs": 300,
            "backup": false,
            "format": { "indentWidth": 4 },
            "artifacts": { "markerAttribute": "data-ui" }
        }"#;

        let config: ProjectConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.latency_budget_ms, 100);
        assert!(!config.backup);
        assert!(config.watch);
        assert_eq!(config.format.indent_width, 4);
        assert_eq!(config.artifacts.marker_attribute, "data-ui");
        assert!(config.artifacts.strip_classes.contains(&"selected".to_string()));
    }

    #[test]
    fn test_default_config() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ProjectConfig::load(dir.path()).unwrap(), ProjectConfig::default());
    }

    #[test]
    fn test_prettierrc_overrides_format() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            r#"{ "format": { "indentWidth": 4, "finalNewline": false } }"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join(PRETTIER_CONFIG_NAME),
            r#"{ "tabWidth": 2, "useTabs": true, "singleQuote": true, "trailingComma": "es5" }"#,
        )
        .unwrap();

        let config = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(config.format.indent_width, 2);
        assert!(config.format.use_tabs);
        assert_eq!(config.format.quote, QuoteStyle::Single);
        assert!(!config.format.final_newline);

        let env = config.environment();
        assert_eq!(env.format, config.format);
        assert_eq!(env.debounce, Duration::from_millis(150));
    }

    #[test]
    fn test_quote_style_follows_prettier() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ProjectConfig::load(dir.path()).unwrap().format.quote, QuoteStyle::Single);

        std::fs::write(dir.path().join(PRETTIER_CONFIG_NAME), r#"{ "semi": false }"#).unwrap();
        let config = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(config.format.quote, QuoteStyle::Double);
        assert_eq!(config.format.indent_width, 2);
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), "{ debounceMs: }").unwrap();
        assert!(matches!(
            ProjectConfig::load(dir.path()),
            Err(ConfigError::Json { .. })
        ));
    }
}
