use serde::{Deserialize, Serialize};
use std::path::Path;

/// Markup grammar variant. Vue templates are plain HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    #[default]
    Html,
    Jsx,
}

impl Flavor {
    /// Document Tree attribute name for an attribute written as `name`
    pub fn attribute_key(self, name: &str) -> String {
        match (self, name) {
            (Flavor::Jsx, "className") => "class".to_string(),
            (Flavor::Jsx, "htmlFor") => "for".to_string(),
            _ => name.to_string(),
        }
    }

    /// Inverse of `attribute_key`
    pub fn source_attribute_name(self, key: &str) -> &str {
        match (self, key) {
            (Flavor::Jsx, "class") => "className",
            (Flavor::Jsx, "for") => "htmlFor",
            _ => key,
        }
    }

    /// Closing tags match case-insensitively in HTML, exactly in JSX
    pub fn tags_match(self, open: &str, close: &str) -> bool {
        match self {
            Flavor::Html => open.eq_ignore_ascii_case(close),
            Flavor::Jsx => open == close,
        }
    }
}

impl std::fmt::Display for Flavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Flavor::Html => f.write_str("html"),
            Flavor::Jsx => f.write_str("jsx"),
        }
    }
}

/// Source dialects keyed by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Html,
    Jsx,
    Tsx,
    Vue,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [Dialect::Html, Dialect::Jsx, Dialect::Tsx, Dialect::Vue];

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(Dialect::Html),
            "jsx" => Some(Dialect::Jsx),
            "tsx" => Some(Dialect::Tsx),
            "vue" => Some(Dialect::Vue),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Dialect::Html => &["html", "htm"],
            Dialect::Jsx => &["jsx"],
            Dialect::Tsx => &["tsx"],
            Dialect::Vue => &["vue"],
        }
    }

    /// Vue SFCs carry independent template/script/style sections
    pub fn is_sectioned(self) -> bool {
        matches!(self, Dialect::Vue)
    }

    /// Grammar of the dialect's markup document
    pub fn flavor(self) -> Flavor {
        match self {
            Dialect::Html | Dialect::Vue => Flavor::Html,
            Dialect::Jsx | Dialect::Tsx => Flavor::Jsx,
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extensions()[0])
    }
}
