//! # Markup Tokenizer
//!
//! Two logos lexers share the work:
//!
//! ```text
//!   content mode ──`<name`──▶ tag mode ──`>` / `/>`──▶ content mode
//!        │                                   │
//!        └── text, `{expr}`, `</name>`       └── raw text for <script>/<style>/…
//! ```
//!
//! The content lexer is restarted at the current position for every token, so
//! the tokenizer can stop anywhere (JSX markup embedded in a module ends at its
//! last closing tag, not at the end of the file).

use crate::dialect::Flavor;
use crate::error::{ParseError, ParseResult};
use crate::tree::is_raw_text_element;
use logos::{Lexer, Logos};
use std::collections::VecDeque;
use std::ops::Range;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(extras = Flavor)]
enum ContentToken {
    #[token("<!--", skip_comment)]
    Comment,

    #[regex(r"<![a-zA-Z\[][^>]*>")]
    Declaration,

    #[regex(r"<\?[^>]*>")]
    Instruction,

    #[regex(r"</[a-zA-Z][a-zA-Z0-9:._-]*[ \t\r\n]*>")]
    CloseTag,

    #[regex(r"<[a-zA-Z][a-zA-Z0-9:._-]*")]
    OpenTag,

    #[token("<>")]
    FragmentOpen,

    #[token("</>")]
    FragmentClose,

    #[token("{", braced_content)]
    Braced,

    #[regex(r"[^<{]+")]
    Text,

    #[token("<")]
    StrayAngle,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(extras = Flavor)]
#[logos(skip r"[ \t\r\n\f]+")]
enum TagToken {
    #[token(">")]
    End,

    #[token("/>")]
    SelfClosingEnd,

    #[token("=")]
    Equals,

    #[regex(r#""[^"]*""#)]
    DoubleQuoted,

    #[regex(r"'[^']*'")]
    SingleQuoted,

    #[token("{", braced_attribute)]
    Expression,

    #[regex(r#"[^ \t\r\n\f"'=<>/{}`]+"#)]
    Word,

    #[token("/")]
    Slash,
}

fn skip_comment(lex: &mut Lexer<ContentToken>) -> bool {
    match lex.remainder().find("-->") {
        Some(end) => {
            lex.bump(end + 3);
            true
        }
        None => false,
    }
}

fn braced_content(lex: &mut Lexer<ContentToken>) -> bool {
    if lex.extras == Flavor::Jsx {
        if let Some(len) = balanced_braces(lex.remainder()) {
            lex.bump(len);
        }
    }
    true
}

fn braced_attribute(lex: &mut Lexer<TagToken>) -> bool {
    if lex.extras != Flavor::Jsx {
        return false;
    }
    match balanced_braces(lex.remainder()) {
        Some(len) => {
            lex.bump(len);
            true
        }
        None => false,
    }
}

/// Length up to and including the `}` closing an already consumed `{`.
/// String literals are skipped so braces inside them don't count.
pub(crate) fn balanced_braces(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut depth = 1usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            quote @ (b'"' | b'\'' | b'`') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// How an attribute value was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    DoubleQuoted,
    SingleQuoted,
    Unquoted,
    /// JSX `{expression}`
    Expression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue<'src> {
    /// Value text without quotes or braces
    pub text: &'src str,
    /// Full value span, quotes or braces included
    pub span: Range<usize>,
    pub kind: ValueKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute<'src> {
    pub name: &'src str,
    pub name_span: Range<usize>,
    pub value: Option<RawValue<'src>>,
}

impl RawAttribute<'_> {
    /// Span from the name to the end of the value
    pub fn span(&self) -> Range<usize> {
        let end = self
            .value
            .as_ref()
            .map_or(self.name_span.end, |value| value.span.end);
        self.name_span.start..end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupToken<'src> {
    /// `<name`
    OpenTagStart(&'src str),
    Attribute(RawAttribute<'src>),
    /// `>` or `/>`
    OpenTagEnd { self_closing: bool },
    /// `</name>`
    CloseTag(&'src str),
    FragmentOpen,
    FragmentClose,
    /// Unnormalized character data, entities still encoded
    Text(&'src str),
    /// Verbatim content of a raw-text element
    RawText(&'src str),
    /// JSX `{expression}` child, braces included
    Expression(&'src str),
}

pub type Spanned<'src> = (MarkupToken<'src>, Range<usize>);

pub struct Tokenizer<'src> {
    source: &'src str,
    flavor: Flavor,
    pos: usize,
    end: usize,
    queued: VecDeque<Spanned<'src>>,
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str, flavor: Flavor) -> Self {
        Self::bounded(source, flavor, 0..source.len())
    }

    /// Tokenize only `range` of `source`; spans stay relative to `source`
    pub fn bounded(source: &'src str, flavor: Flavor, range: Range<usize>) -> Self {
        Self {
            source,
            flavor,
            pos: range.start,
            end: range.end.min(source.len()),
            queued: VecDeque::new(),
        }
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Position the next token starts from
    pub fn position(&self) -> usize {
        self.queued
            .front()
            .map_or(self.pos, |(_, span)| span.start)
    }

    pub fn next_token(&mut self) -> ParseResult<Option<Spanned<'src>>> {
        if let Some(token) = self.queued.pop_front() {
            return Ok(Some(token));
        }

        let source = self.source;
        loop {
            let base = self.pos;
            let mut lex = self.content_lexer(base);
            let Some(result) = lex.next() else {
                return Ok(None);
            };
            let span = base + lex.span().start..base + lex.span().end;
            let kind = result.map_err(|()| self.lex_error(span.start))?;
            self.pos = span.end;

            let token = match kind {
                ContentToken::Comment | ContentToken::Declaration | ContentToken::Instruction => {
                    continue
                }
                ContentToken::OpenTag => {
                    let name = &source[span.start + 1..span.end];
                    self.lex_tag(lex.morph(), base, name, span.start)?;
                    MarkupToken::OpenTagStart(name)
                }
                ContentToken::CloseTag => MarkupToken::CloseTag(close_tag_name(&source[span.clone()])),
                ContentToken::FragmentOpen => MarkupToken::FragmentOpen,
                ContentToken::FragmentClose => MarkupToken::FragmentClose,
                ContentToken::Braced if self.flavor == Flavor::Jsx && span.len() > 1 => {
                    MarkupToken::Expression(&source[span.clone()])
                }
                ContentToken::Text | ContentToken::StrayAngle | ContentToken::Braced => {
                    let end = self.extend_text_run(span.end);
                    self.pos = end;
                    return Ok(Some((MarkupToken::Text(&source[span.start..end]), span.start..end)));
                }
            };
            return Ok(Some((token, span)));
        }
    }

    fn content_lexer(&self, at: usize) -> Lexer<'src, ContentToken> {
        let source = self.source;
        ContentToken::lexer_with_extras(&source[at..self.end], self.flavor)
    }

    /// Text, stray `<` and unbalanced `{` glue together into one run
    fn extend_text_run(&self, mut at: usize) -> usize {
        while at < self.end {
            let mut lex = self.content_lexer(at);
            match lex.next() {
                Some(Ok(ContentToken::Text | ContentToken::StrayAngle)) => at += lex.span().end,
                Some(Ok(ContentToken::Braced)) if lex.slice().len() == 1 => at += lex.span().end,
                _ => break,
            }
        }
        at
    }

    fn lex_tag(
        &mut self,
        mut tag: Lexer<'src, TagToken>,
        base: usize,
        name: &'src str,
        tag_start: usize,
    ) -> ParseResult<()> {
        let source = self.source;
        let malformed = || ParseError::unclosed_tag(tag_start, format!("malformed <{name}> tag"));
        let mut pending: Option<(&'src str, Range<usize>)> = None;
        let mut awaiting_value = false;

        while let Some(result) = tag.next() {
            let span = base + tag.span().start..base + tag.span().end;
            let token = result.map_err(|()| malformed())?;

            match token {
                TagToken::End | TagToken::SelfClosingEnd => {
                    if let Some((attr, name_span)) = pending.take() {
                        self.queue_attribute(attr, name_span, None);
                    }
                    let self_closing = token == TagToken::SelfClosingEnd;
                    self.queued
                        .push_back((MarkupToken::OpenTagEnd { self_closing }, span.clone()));
                    self.pos = span.end;

                    if !self_closing && self.flavor == Flavor::Html && is_raw_text_element(name) {
                        self.lex_raw_text(name, tag_start)?;
                    }
                    return Ok(());
                }
                TagToken::Equals => {
                    if pending.is_none() || awaiting_value {
                        return Err(malformed());
                    }
                    awaiting_value = true;
                }
                TagToken::Slash => {}
                TagToken::Word
                | TagToken::DoubleQuoted
                | TagToken::SingleQuoted
                | TagToken::Expression => {
                    let slice = &source[span.clone()];
                    if awaiting_value {
                        let (attr, name_span) = pending.take().ok_or_else(malformed)?;
                        let value = raw_value(token, slice, span);
                        self.queue_attribute(attr, name_span, Some(value));
                        awaiting_value = false;
                        continue;
                    }

                    if let Some((attr, name_span)) = pending.take() {
                        self.queue_attribute(attr, name_span, None);
                    }
                    match token {
                        TagToken::Word => pending = Some((slice, span)),
                        // `{...props}`
                        TagToken::Expression => self.queue_attribute(slice, span, None),
                        _ => return Err(malformed()),
                    }
                }
            }
        }

        Err(ParseError::unclosed_tag(
            tag_start,
            format!("<{name}> tag is never closed"),
        ))
    }

    fn queue_attribute(
        &mut self,
        name: &'src str,
        name_span: Range<usize>,
        value: Option<RawValue<'src>>,
    ) {
        let attribute = RawAttribute {
            name,
            name_span,
            value,
        };
        let span = attribute.span();
        self.queued
            .push_back((MarkupToken::Attribute(attribute), span));
    }

    fn lex_raw_text(&mut self, name: &str, tag_start: usize) -> ParseResult<()> {
        let source = self.source;
        let rest = &source[self.pos..self.end];
        let len = find_closing_tag(rest, name).ok_or_else(|| {
            ParseError::unclosed_tag(tag_start, format!("<{name}> is never closed"))
        })?;
        if len > 0 {
            let span = self.pos..self.pos + len;
            self.queued
                .push_back((MarkupToken::RawText(&source[span.clone()]), span));
        }
        self.pos += len;
        Ok(())
    }

    fn lex_error(&self, position: usize) -> ParseError {
        let rest = &self.source[position..self.end];
        if rest.starts_with("<!--") {
            ParseError::unclosed_tag(position, "comment is never closed")
        } else {
            ParseError::unclosed_tag(position, "unexpected input")
        }
    }
}

fn raw_value(token: TagToken, slice: &str, span: Range<usize>) -> RawValue<'_> {
    let (text, kind) = match token {
        TagToken::DoubleQuoted => (&slice[1..slice.len() - 1], ValueKind::DoubleQuoted),
        TagToken::SingleQuoted => (&slice[1..slice.len() - 1], ValueKind::SingleQuoted),
        TagToken::Expression => (&slice[1..slice.len() - 1], ValueKind::Expression),
        _ => (slice, ValueKind::Unquoted),
    };
    RawValue { text, span, kind }
}

fn close_tag_name(slice: &str) -> &str {
    slice
        .trim_start_matches("</")
        .trim_end_matches('>')
        .trim_end()
}

/// Offset of the `</name` that closes a raw-text element
fn find_closing_tag(rest: &str, name: &str) -> Option<usize> {
    let lower = rest.to_ascii_lowercase();
    let needle = format!("</{}", name.to_ascii_lowercase());
    let mut from = 0;
    while let Some(found) = lower[from..].find(&needle) {
        let at = from + found;
        let after = at + needle.len();
        match lower[after..].chars().next() {
            Some(c) if c == '>' || c.is_ascii_whitespace() => return Some(at),
            None => return None,
            _ => from = after,
        }
    }
    None
}

/// Tokenize a whole text eagerly
pub fn tokenize(source: &str, flavor: Flavor) -> ParseResult<Vec<Spanned<'_>>> {
    let mut tokenizer = Tokenizer::new(source, flavor);
    let mut tokens = Vec::new();
    while let Some(token) = tokenizer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}
