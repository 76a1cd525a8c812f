//! # Dialect descriptors
//!
//! How a file extension is parsed and printed. The registry is built once at
//! startup and shared read-only between sessions.

use dragndrop_parser::{parse, Dialect, Flavor, Node, ParseResult, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    #[default]
    Double,
    Single,
}

/// Pretty-printing rules shared by serializers and the formatter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatOptions {
    pub indent_width: usize,
    pub use_tabs: bool,
    /// Quote for JSX attribute and style strings. HTML attributes always use
    /// double quotes.
    pub quote: QuoteStyle,
    pub final_newline: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_width: 2,
            use_tabs: false,
            quote: QuoteStyle::Double,
            final_newline: true,
        }
    }
}

impl FormatOptions {
    pub fn indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.indent_width.max(1))
        }
    }

    pub fn quote_char(&self, flavor: Flavor) -> char {
        match (flavor, self.quote) {
            (Flavor::Jsx, QuoteStyle::Single) => '\'',
            _ => '"',
        }
    }

    /// Serializer for `flavor` configured with these options
    pub fn serializer(&self, flavor: Flavor) -> Serializer {
        Serializer::with_indent(flavor, &self.indent_unit()).with_quote(self.quote_char(flavor))
    }
}

/// Parse/print rules for one dialect
pub trait DialectSyntax: Send + Sync {
    fn dialect(&self) -> Dialect;

    fn parse(&self, text: &str) -> ParseResult<Node> {
        parse(text, self.dialect())
    }

    /// Print a whole file for `tree`
    fn serialize(&self, tree: &Node, options: &FormatOptions) -> String;

    /// Whether the file holds independent template/script/style sections
    fn sectioned(&self) -> bool {
        self.dialect().is_sectioned()
    }
}

pub struct HtmlSyntax;

impl DialectSyntax for HtmlSyntax {
    fn dialect(&self) -> Dialect {
        Dialect::Html
    }

    fn serialize(&self, tree: &Node, options: &FormatOptions) -> String {
        let mut output = options.serializer(Flavor::Html).serialize(tree);
        output.push('\n');
        output
    }
}

/// JSX and TSX modules: the tree becomes the markup returned by a component
pub struct JsxSyntax {
    dialect: Dialect,
}

impl JsxSyntax {
    pub fn jsx() -> Self {
        Self {
            dialect: Dialect::Jsx,
        }
    }

    pub fn tsx() -> Self {
        Self {
            dialect: Dialect::Tsx,
        }
    }
}

impl DialectSyntax for JsxSyntax {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn serialize(&self, tree: &Node, options: &FormatOptions) -> String {
        let unit = options.indent_unit();
        let markup = options
            .serializer(Flavor::Jsx)
            .at_level(2)
            .serialize(tree);
        format!("export default function Component() {{\n{unit}return (\n{unit}{unit}{markup}\n{unit});\n}}\n")
    }
}

pub struct VueSyntax;

impl DialectSyntax for VueSyntax {
    fn dialect(&self) -> Dialect {
        Dialect::Vue
    }

    fn serialize(&self, tree: &Node, options: &FormatOptions) -> String {
        let unit = options.indent_unit();
        let markup = if tree.is_synthetic_root() && tree.children().is_empty() {
            String::new()
        } else {
            format!("{unit}{}\n", options.serializer(Flavor::Html).at_level(1).serialize(tree))
        };
        format!("<template>\n{markup}</template>\n")
    }
}

/// Extension → dialect syntax
#[derive(Clone, Default)]
pub struct DialectRegistry {
    by_extension: HashMap<String, Arc<dyn DialectSyntax>>,
}

impl DialectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in HTML, JSX, TSX and Vue dialects
    pub fn with_defaults() -> Self {
        Self::new()
            .register(Arc::new(HtmlSyntax))
            .register(Arc::new(JsxSyntax::jsx()))
            .register(Arc::new(JsxSyntax::tsx()))
            .register(Arc::new(VueSyntax))
    }

    /// Register `syntax` for every extension of its dialect
    pub fn register(mut self, syntax: Arc<dyn DialectSyntax>) -> Self {
        for extension in syntax.dialect().extensions() {
            self.by_extension
                .insert(extension.to_string(), Arc::clone(&syntax));
        }
        self
    }

    pub fn for_extension(&self, extension: &str) -> Option<Arc<dyn DialectSyntax>> {
        self.by_extension
            .get(&extension.to_ascii_lowercase())
            .cloned()
    }

    pub fn for_path(&self, path: &Path) -> Option<Arc<dyn DialectSyntax>> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.for_extension(ext))
    }

    pub fn get(&self, dialect: Dialect) -> Option<Arc<dyn DialectSyntax>> {
        dialect
            .extensions()
            .first()
            .and_then(|ext| self.for_extension(ext))
    }
}

impl std::fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut extensions: Vec<_> = self.by_extension.keys().collect();
        extensions.sort();
        f.debug_struct("DialectRegistry")
            .field("extensions", &extensions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let registry = DialectRegistry::with_defaults();
        assert_eq!(registry.for_extension("HTM").map(|s| s.dialect()), Some(Dialect::Html));
        assert_eq!(
            registry.for_path(Path::new("src/App.tsx")).map(|s| s.dialect()),
            Some(Dialect::Tsx)
        );
        assert!(registry.for_path(Path::new("README.md")).is_none());
        assert!(registry.get(Dialect::Vue).is_some_and(|s| s.sectioned()));
    }

    #[test]
    fn test_serialized_files_parse_back() {
        let tree = Node::element("main")
            .with_attr("class", "page")
            .with_child(Node::element("h1").with_child(Node::text("Hi")));
        let registry = DialectRegistry::with_defaults();
        let options = FormatOptions::default();
        for dialect in Dialect::ALL {
            let syntax = registry.get(dialect).unwrap();
            let text = syntax.serialize(&tree, &options);
            assert_eq!(syntax.parse(&text).unwrap(), tree, "{dialect}:\n{text}");
        }
    }

    #[test]
    fn test_jsx_module_shape() {
        let text = JsxSyntax::jsx().serialize(&Node::element("div"), &FormatOptions::default());
        assert_eq!(
            text,
            "export default function Component() {\n  return (\n    <div />\n  );\n}\n"
        );
    }

    #[test]
    fn test_format_options_from_json() {
        let options: FormatOptions =
            serde_json::from_str(r#"{ "indentWidth": 4, "quote": "single" }"#).unwrap();
        assert_eq!(options.indent_unit(), "    ");
        assert_eq!(options.quote_char(Flavor::Jsx), '\'');
        assert_eq!(options.quote_char(Flavor::Html), '"');
        assert!(options.final_newline);
    }
}
