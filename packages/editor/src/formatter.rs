//! Pretty-printing pass run on patched source text.
//!
//! Formatting is never allowed to change what the file means: the patch
//! pipeline goes through [`format_checked`], which re-parses the output and
//! rejects it when the Document Tree differs. Sectioned files only have
//! their template content formatted; script and style bytes are kept.

use crate::dialect::FormatOptions;
use dragndrop_parser::{parse, split_sections, Dialect, ParseError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Formatter failed: {0}")]
    Failed(String),

    #[error("Formatting changed the document tree of a {0} file")]
    SemanticsChanged(Dialect),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

pub trait Formatter: Send + Sync {
    fn format(&self, text: &str, dialect: Dialect, options: &FormatOptions) -> Result<String, FormatError>;
}

/// Whitespace-level formatter: line endings, leading indentation, trailing
/// whitespace and the final newline. Lines inside `<pre>`/`<textarea>` and
/// inside multi-line template literals are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupFormatter;

impl Formatter for MarkupFormatter {
    fn format(&self, text: &str, dialect: Dialect, options: &FormatOptions) -> Result<String, FormatError> {
        let text = text.replace("\r\n", "\n");
        let scripted = matches!(dialect, Dialect::Jsx | Dialect::Tsx | Dialect::Vue);
        let mut verbatim = Verbatim::default();
        let mut lines = Vec::new();

        for line in text.split('\n') {
            if verbatim.active() {
                lines.push(line.to_string());
            } else {
                lines.push(reindent(line.trim_end(), options));
            }
            verbatim.scan(line, scripted);
        }

        let mut output = lines.join("\n");
        if options.final_newline {
            let trimmed = output.trim_end_matches('\n').len();
            output.truncate(trimmed);
            output.push('\n');
        }
        Ok(output)
    }
}

/// Tracks whether the next line starts inside content that must not be touched
#[derive(Default)]
struct Verbatim {
    element: Option<&'static str>,
    template_literal: bool,
}

impl Verbatim {
    fn active(&self) -> bool {
        self.element.is_some() || self.template_literal
    }

    fn scan(&mut self, line: &str, scripted: bool) {
        let lower = line.to_ascii_lowercase();
        let mut rest = lower.as_str();
        loop {
            match self.element {
                Some(tag) => {
                    let close = format!("</{tag}");
                    let Some(at) = rest.find(&close) else { break };
                    self.element = None;
                    rest = &rest[at + close.len()..];
                }
                None => {
                    let opened = ["pre", "textarea"].into_iter().find_map(|tag| {
                        let open = format!("<{tag}");
                        rest.find(&open)
                            .filter(|&at| {
                                rest[at + open.len()..]
                                    .starts_with(|c: char| c == '>' || c.is_ascii_whitespace())
                            })
                            .map(|at| (tag, at + open.len()))
                    });
                    let Some((tag, after)) = opened else { break };
                    self.element = Some(tag);
                    rest = &rest[after..];
                }
            }
        }

        if scripted {
            let mut escaped = false;
            for c in line.chars() {
                match c {
                    '\\' if !escaped => {
                        escaped = true;
                        continue;
                    }
                    '`' if !escaped => self.template_literal = !self.template_literal,
                    _ => {}
                }
                escaped = false;
            }
        }
    }
}

/// Rewrite leading indentation in the configured unit
fn reindent(line: &str, options: &FormatOptions) -> String {
    let body = line.trim_start_matches([' ', '\t']);
    if body.is_empty() {
        return String::new();
    }
    let width = options.indent_width.max(1);
    let columns: usize = line[..line.len() - body.len()]
        .chars()
        .map(|c| if c == '\t' { width } else { 1 })
        .sum();

    let indent = if options.use_tabs {
        format!("{}{}", "\t".repeat(columns / width), " ".repeat(columns % width))
    } else {
        " ".repeat(columns)
    };
    format!("{indent}{body}")
}

/// Format `text`, rejecting output whose Document Tree differs from the input's
pub fn format_checked(
    formatter: &dyn Formatter,
    text: &str,
    dialect: Dialect,
    options: &FormatOptions,
) -> Result<String, FormatError> {
    let formatted = if dialect.is_sectioned() {
        format_template(formatter, text, options)?
    } else {
        formatter.format(text, dialect, options)?
    };
    if formatted == text {
        return Ok(formatted);
    }
    let before = parse(text, dialect)?;
    let after = parse(&formatted, dialect)?;
    if before != after {
        return Err(FormatError::SemanticsChanged(dialect));
    }
    Ok(formatted)
}

/// Format the inner bytes of the template section, leaving the rest of the
/// file as it is
fn format_template(formatter: &dyn Formatter, text: &str, options: &FormatOptions) -> Result<String, FormatError> {
    let sections = split_sections(text)?;
    let Some(template) = sections.template else {
        return Ok(text.to_string());
    };
    let inner = FormatOptions {
        final_newline: false,
        ..options.clone()
    };
    let formatted = formatter.format(template.text(text), Dialect::Html, &inner)?;

    let mut output = text.to_string();
    output.replace_range(template.content, &formatted);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(text: &str, options: &FormatOptions) -> String {
        MarkupFormatter.format(text, Dialect::Html, options).unwrap()
    }

    #[test]
    fn test_whitespace_cleanup() {
        let text = "<div>  \r\n\t<p>Hi</p>   \r\n</div>\n\n\n";
        assert_eq!(
            format(text, &FormatOptions::default()),
            "<div>\n  <p>Hi</p>\n</div>\n"
        );
    }

    #[test]
    fn test_tabs() {
        let options = FormatOptions {
            use_tabs: true,
            ..FormatOptions::default()
        };
        assert_eq!(format("<div>\n    <p></p>\n</div>", &options), "<div>\n\t\t<p></p>\n</div>\n");
    }

    #[test]
    fn test_pre_is_verbatim() {
        let text = "<pre>\n    keep   \n\t  this\n</pre>\n    <p></p>";
        assert_eq!(
            format(text, &FormatOptions::default()),
            "<pre>\n    keep   \n\t  this\n</pre>\n    <p></p>\n"
        );
    }

    #[test]
    fn test_template_literals_are_verbatim() {
        let text = "const s = `\n\tline  \n`;\n\tconst x = 1;";
        let out = MarkupFormatter
            .format(text, Dialect::Jsx, &FormatOptions::default())
            .unwrap();
        assert_eq!(out, "const s = `\n\tline  \n`;\n  const x = 1;\n");
    }

    struct Breaking;

    impl Formatter for Breaking {
        fn format(&self, text: &str, _: Dialect, _: &FormatOptions) -> Result<String, FormatError> {
            Ok(text.replace("Hi", "Bye"))
        }
    }

    #[test]
    fn test_semantic_changes_are_rejected() {
        let err = format_checked(&Breaking, "<p>Hi</p>", Dialect::Html, &FormatOptions::default())
            .unwrap_err();
        assert_eq!(err, FormatError::SemanticsChanged(Dialect::Html));

        let ok = format_checked(&MarkupFormatter, "<p>Hi</p>  ", Dialect::Html, &FormatOptions::default());
        assert_eq!(ok.unwrap(), "<p>Hi</p>\n");
    }

    #[test]
    fn test_vue_formats_only_the_template() {
        let source = "<template>\n\t<p>Hi</p>   \n</template>\n<script>\nexport default {\n\tdata() {\n\t\treturn { a: 1 }   \n\t}\n}\n</script>\n<style>\n\tp { margin: 0; }  \n</style>";
        let out = format_checked(&MarkupFormatter, source, Dialect::Vue, &FormatOptions::default()).unwrap();
        assert_eq!(
            out,
            "<template>\n  <p>Hi</p>\n</template>\n<script>\nexport default {\n\tdata() {\n\t\treturn { a: 1 }   \n\t}\n}\n</script>\n<style>\n\tp { margin: 0; }  \n</style>"
        );
    }
}
