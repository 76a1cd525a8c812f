//! # Patch Pipeline
//!
//! Routes a batch of operations to the text strategy of the file's dialect,
//! then runs the formatter over the result:
//!
//! ```text
//!   Html      → byte-range edits (text_patch)
//!   Jsx/Tsx   → syntax tree, byte-range fallback (jsx_ast)
//!   Vue       → template section, byte-range edits (vue)
//!        ↓
//!   format_checked → unformatted text kept when formatting fails
//! ```

use crate::dialect::FormatOptions;
use crate::formatter::{format_checked, Formatter};
use crate::jsx_ast::{patch_jsx, ScriptParser};
use crate::text_patch::patch_text;
use crate::vue::{patch_vue, VuePatch};
use dragndrop_parser::{parse_document, Dialect};
use dragndrop_vdom::{EditOperation, PatchError};
use tracing::warn;

/// Apply `ops` to the text of a `dialect` file. Vue operations target the
/// template section.
pub fn patch_source(
    dialect: Dialect,
    source: &str,
    ops: &[EditOperation],
    options: &FormatOptions,
    scripts: &dyn ScriptParser,
) -> Result<String, PatchError> {
    if ops.is_empty() {
        return Ok(source.to_string());
    }
    match dialect {
        Dialect::Html => {
            let parsed = parse_document(source, dialect.flavor())?;
            patch_text(source, &parsed, ops, dialect.flavor(), options)
        }
        Dialect::Jsx | Dialect::Tsx => patch_jsx(source, ops, options, scripts),
        Dialect::Vue => patch_vue(source, &VuePatch::template(ops.to_vec()), options, scripts),
    }
}

/// Result of [`Pipeline::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutput {
    pub text: String,
    /// False when the formatter failed and the patched text is used as is
    pub formatted: bool,
}

/// Patch + format for one dialect
pub struct Pipeline<'a> {
    pub dialect: Dialect,
    pub options: &'a FormatOptions,
    pub scripts: &'a dyn ScriptParser,
    pub formatter: Option<&'a dyn Formatter>,
}

impl Pipeline<'_> {
    pub fn run(&self, source: &str, ops: &[EditOperation]) -> Result<PatchOutput, PatchError> {
        let text = patch_source(self.dialect, source, ops, self.options, self.scripts)?;
        let Some(formatter) = self.formatter else {
            return Ok(PatchOutput { text, formatted: false });
        };

        match format_checked(formatter, &text, self.dialect, self.options) {
            Ok(formatted) => Ok(PatchOutput {
                text: formatted,
                formatted: true,
            }),
            Err(error) => {
                warn!(%error, dialect = %self.dialect, "Formatting failed, keeping unformatted text");
                Ok(PatchOutput { text, formatted: false })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::{FormatError, MarkupFormatter};
    use crate::jsx_ast::JsxModuleParser;
    use dragndrop_parser::{parse, Node};
    use dragndrop_vdom::diff;

    fn pipeline<'a>(dialect: Dialect, options: &'a FormatOptions, formatter: Option<&'a dyn Formatter>) -> Pipeline<'a> {
        Pipeline {
            dialect,
            options,
            scripts: &JsxModuleParser,
            formatter,
        }
    }

    #[test]
    fn test_each_dialect_reaches_the_target_tree() {
        let sources = [
            (Dialect::Html, "<ul>\n  <li>One</li>\n</ul>\n"),
            (Dialect::Jsx, "export const List = () => (\n  <ul>\n    <li>One</li>\n  </ul>\n);\n"),
            (Dialect::Tsx, "export function List(): JSX.Element {\n  return <ul><li>One</li></ul>;\n}\n"),
            (Dialect::Vue, "<template>\n  <ul>\n    <li>One</li>\n  </ul>\n</template>\n"),
        ];
        let target = Node::element("ul")
            .with_child(Node::element("li").with_child(Node::text("One")))
            .with_child(Node::element("li").with_attr("class", "new").with_child(Node::text("Two")));
        let options = FormatOptions::default();

        for (dialect, source) in sources {
            let ops = diff(&parse(source, dialect).unwrap(), &target);
            let output = pipeline(dialect, &options, Some(&MarkupFormatter)).run(source, &ops).unwrap();
            assert!(output.formatted);
            assert_eq!(parse(&output.text, dialect).unwrap(), target, "{dialect}:\n{}", output.text);
        }
    }

    #[test]
    fn test_no_operations_return_source() {
        let source = "<p>unchanged</p>";
        let options = FormatOptions::default();
        let output = pipeline(Dialect::Html, &options, None).run(source, &[]).unwrap();
        assert_eq!(output.text, source);
        assert!(!output.formatted);
    }

    struct Failing;

    impl Formatter for Failing {
        fn format(&self, _: &str, _: Dialect, _: &FormatOptions) -> Result<String, FormatError> {
            Err(FormatError::Failed("boom".to_string()))
        }
    }

    #[test]
    fn test_formatter_failure_keeps_patched_text() {
        let source = "<p class=\"a\">Hi</p>";
        let ops = diff(
            &parse(source, Dialect::Html).unwrap(),
            &parse("<p class=\"b\">Hi</p>", Dialect::Html).unwrap(),
        );
        let options = FormatOptions::default();
        let output = pipeline(Dialect::Html, &options, Some(&Failing)).run(source, &ops).unwrap();
        assert_eq!(output.text, "<p class=\"b\">Hi</p>");
        assert!(!output.formatted);
    }
}
