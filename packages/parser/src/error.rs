use std::fmt;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// An element was opened but never closed (or its open tag never ended)
    UnclosedTag,
    /// A closing tag does not match the innermost open element
    MismatchedTag,
    /// Section boundaries (Vue blocks, JSX render region) could not be located
    InvalidSection,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ParseErrorKind::UnclosedTag => "unclosed tag",
            ParseErrorKind::MismatchedTag => "mismatched tag",
            ParseErrorKind::InvalidSection => "invalid section",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {position}: {message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Byte offset into the parsed text
    pub position: usize,
    pub message: String,
}

impl ParseError {
    pub fn unclosed_tag(position: usize, message: impl Into<String>) -> Self {
        Self {
            kind: ParseErrorKind::UnclosedTag,
            position,
            message: message.into(),
        }
    }

    pub fn mismatched_tag(position: usize, message: impl Into<String>) -> Self {
        Self {
            kind: ParseErrorKind::MismatchedTag,
            position,
            message: message.into(),
        }
    }

    pub fn invalid_section(position: usize, message: impl Into<String>) -> Self {
        Self {
            kind: ParseErrorKind::InvalidSection,
            position,
            message: message.into(),
        }
    }

    /// Shift the position of an error raised on a slice of a larger text
    pub fn offset(mut self, base: usize) -> Self {
        self.position += base;
        self
    }

    /// 1-based line and column of the error position in `source`
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let upto = &source[..self.position.min(source.len())];
        let line = upto.matches('\n').count() + 1;
        let column = upto.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
        (line, column)
    }

    /// Render a human readable diagnostic for this error
    #[cfg(feature = "pretty-errors")]
    pub fn report(&self, file_name: &str, source: &str) -> String {
        use ariadne::{Config, Label, Report, ReportKind, Source};

        let start = self.position.min(source.len());
        let end = (start + 1).min(source.len()).max(start);
        let mut out = Vec::new();
        let written = Report::build(ReportKind::Error, file_name, start)
            .with_config(Config::default().with_color(false))
            .with_message(self.kind.to_string())
            .with_label(Label::new((file_name, start..end)).with_message(&self.message))
            .finish()
            .write((file_name, Source::from(source)), &mut out);

        match written {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(_) => self.report_plain(file_name, source),
        }
    }

    #[cfg(not(feature = "pretty-errors"))]
    pub fn report(&self, file_name: &str, source: &str) -> String {
        self.report_plain(file_name, source)
    }

    fn report_plain(&self, file_name: &str, source: &str) -> String {
        let (line, column) = self.line_col(source);
        format!("{file_name}:{line}:{column}: {}: {}", self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let source = "<div>\n  <p>\n</div>";
        let err = ParseError::mismatched_tag(12, "expected </p>");
        assert_eq!(err.line_col(source), (3, 1));
    }

    #[test]
    fn test_report_mentions_kind_and_message() {
        let source = "<div><p>Text</div>";
        let err = ParseError::mismatched_tag(12, "expected </p>, found </div>");
        let report = err.report("index.html", source);
        assert!(report.contains("mismatched tag"));
        assert!(report.contains("expected </p>"));
    }
}
