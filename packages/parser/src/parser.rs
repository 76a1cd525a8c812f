use crate::dialect::Flavor;
use crate::error::{ParseError, ParseResult};
use crate::spans::{AttributeSpan, ElementSpan, NodeSpan, ParsedDocument, SpanTree};
use crate::style::{parse_declarations, parse_style_object};
use crate::text::{decode_entities, normalize_class, normalize_html_text, normalize_jsx_text, trimmed_range};
use crate::tokenizer::{MarkupToken, RawAttribute, Spanned, Tokenizer, ValueKind};
use crate::tree::{is_void_element, Element, Node};
use std::ops::Range;

/// What the current child list is nested in
#[derive(Debug, Clone, Copy)]
enum Parent<'src> {
    Document,
    Element { tag: &'src str, open_at: usize },
    Fragment { open_at: usize },
}

/// How a child list ended
struct Closed {
    /// Span of the closing tag, `None` at end of input
    close: Option<Range<usize>>,
}

/// Recursive-descent parser over the markup token stream
pub struct Parser<'src> {
    region: Range<usize>,
    tokenizer: Tokenizer<'src>,
    peeked: Option<Spanned<'src>>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, flavor: Flavor) -> Self {
        Self::bounded(source, flavor, 0..source.len())
    }

    /// Parse only `region` of `source`. Spans stay relative to `source`.
    pub fn bounded(source: &'src str, flavor: Flavor, region: Range<usize>) -> Self {
        Self {
            region: region.clone(),
            tokenizer: Tokenizer::bounded(source, flavor, region),
            peeked: None,
        }
    }

    fn flavor(&self) -> Flavor {
        self.tokenizer.flavor()
    }

    /// Parse every node in the region
    pub fn parse_document(mut self) -> ParseResult<ParsedDocument> {
        let mut nodes = Vec::new();
        self.parse_children(Parent::Document, &mut nodes)?;
        Ok(ParsedDocument::from_top_level(nodes, self.region.clone()))
    }

    /// Parse exactly one element or fragment at the start of the region and
    /// stop after it. Returns the document and the end of the consumed markup.
    pub fn parse_root_element(mut self) -> ParseResult<(ParsedDocument, usize)> {
        let start = self.tokenizer.position();
        match self.advance()? {
            Some((MarkupToken::OpenTagStart(tag), span)) => {
                let (node, spans) = self.parse_element(tag, span.start)?;
                let end = spans.outer().end;
                Ok((
                    ParsedDocument::from_top_level(vec![(node, spans)], start..end),
                    end,
                ))
            }
            Some((MarkupToken::FragmentOpen, span)) => {
                let mut nodes = Vec::new();
                let closed = self.parse_children(Parent::Fragment { open_at: span.start }, &mut nodes)?;
                let end = closed.close.map_or(span.end, |close| close.end);
                let mut parsed = ParsedDocument::from_top_level(nodes, span.start..end);
                if let NodeSpan::Element(el) = &mut parsed.spans.span {
                    if el.open_tag.is_none() {
                        el.inner = Some(span.end..end - "</>".len());
                    }
                }
                Ok((parsed, end))
            }
            _ => Err(ParseError::invalid_section(start, "expected an element")),
        }
    }

    fn advance(&mut self) -> ParseResult<Option<Spanned<'src>>> {
        match self.peeked.take() {
            Some(token) => Ok(Some(token)),
            None => self.tokenizer.next_token(),
        }
    }

    fn parse_children(
        &mut self,
        parent: Parent<'src>,
        nodes: &mut Vec<(Node, SpanTree)>,
    ) -> ParseResult<Closed> {
        let mut run = TextRun::default();

        loop {
            let next = self.advance()?;
            if !matches!(next, Some((MarkupToken::Text(_), _))) {
                run.flush(self.flavor(), nodes);
            }
            let Some((token, span)) = next else {
                return match parent {
                    Parent::Document => Ok(Closed { close: None }),
                    Parent::Element { tag, open_at } => Err(ParseError::unclosed_tag(
                        open_at,
                        format!("<{tag}> is never closed"),
                    )),
                    Parent::Fragment { open_at } => {
                        Err(ParseError::unclosed_tag(open_at, "fragment is never closed"))
                    }
                };
            };

            match token {
                MarkupToken::OpenTagStart(tag) => {
                    nodes.push(self.parse_element(tag, span.start)?);
                }
                MarkupToken::CloseTag(name) => {
                    return match parent {
                        Parent::Element { tag, .. } if self.flavor().tags_match(tag, name) => {
                            Ok(Closed { close: Some(span) })
                        }
                        Parent::Element { tag, .. } => Err(ParseError::mismatched_tag(
                            span.start,
                            format!("expected </{tag}>, found </{name}>"),
                        )),
                        _ => Err(ParseError::mismatched_tag(
                            span.start,
                            format!("</{name}> has no matching open tag"),
                        )),
                    };
                }
                MarkupToken::FragmentOpen => {
                    // nested fragments contribute their children in place
                    self.parse_children(Parent::Fragment { open_at: span.start }, nodes)?;
                }
                MarkupToken::FragmentClose => {
                    return match parent {
                        Parent::Fragment { .. } => Ok(Closed { close: Some(span) }),
                        _ => Err(ParseError::mismatched_tag(
                            span.start,
                            "</> has no matching fragment",
                        )),
                    };
                }
                MarkupToken::Text(raw) => run.push(raw, span.start),
                MarkupToken::Expression(expression) => {
                    nodes.push((Node::text(expression), SpanTree::text(span)));
                }
                MarkupToken::RawText(_)
                | MarkupToken::Attribute(_)
                | MarkupToken::OpenTagEnd { .. } => {
                    return Err(ParseError::unclosed_tag(span.start, "unexpected token"));
                }
            }
        }
    }

    fn parse_element(&mut self, tag: &'src str, open_at: usize) -> ParseResult<(Node, SpanTree)> {
        let mut element = Element::new(tag);
        let mut attributes = Vec::new();
        let mut attrs_end = open_at + 1 + tag.len();

        let (self_closing, open_end) = loop {
            match self.advance()? {
                Some((MarkupToken::Attribute(raw), span)) => {
                    attrs_end = span.end;
                    if let Some(attr_span) = self.add_attribute(&mut element, raw) {
                        attributes.push(attr_span);
                    }
                }
                Some((MarkupToken::OpenTagEnd { self_closing }, span)) => break (self_closing, span.end),
                _ => {
                    return Err(ParseError::unclosed_tag(
                        open_at,
                        format!("<{tag}> tag is never closed"),
                    ))
                }
            }
        };

        let mut span = ElementSpan {
            outer: open_at..open_end,
            open_tag: Some(open_at..open_end),
            attrs_end,
            inner: None,
            attributes,
        };

        if self_closing || is_void_element(tag) {
            let node = Node::Element(element);
            return Ok((node, element_tree(span, Vec::new())));
        }

        let mut children = Vec::new();
        match self.advance()? {
            Some((MarkupToken::RawText(raw), raw_span)) => {
                let trimmed = trimmed_range(raw);
                if !trimmed.is_empty() {
                    element.children.push(Node::text(&raw[trimmed.clone()]));
                    children.push(SpanTree::text(
                        raw_span.start + trimmed.start..raw_span.start + trimmed.end,
                    ));
                }
            }
            other => self.peeked = other,
        }

        let mut nodes = Vec::new();
        let closed = self.parse_children(Parent::Element { tag, open_at }, &mut nodes)?;
        let close = closed.close.ok_or_else(|| {
            ParseError::unclosed_tag(open_at, format!("<{tag}> is never closed"))
        })?;
        for (node, spans) in nodes {
            element.children.push(node);
            children.push(spans);
        }

        span.inner = Some(open_end..close.start);
        span.outer = open_at..close.end;
        Ok((Node::Element(element), element_tree(span, children)))
    }

    /// Fold one raw attribute into the element. Later duplicates are ignored.
    fn add_attribute(&self, element: &mut Element, raw: RawAttribute<'src>) -> Option<AttributeSpan> {
        let flavor = self.flavor();
        let key = flavor.attribute_key(raw.name);
        if element.attributes.contains_key(&key) || (key == "style" && !element.style.is_empty()) {
            return None;
        }

        let span = AttributeSpan {
            key: key.clone(),
            range: raw.span(),
            value: raw.value.as_ref().map(|value| value.span.clone()),
        };

        let value = match &raw.value {
            None => String::new(),
            Some(value) if value.kind == ValueKind::Expression => {
                if key == "style" {
                    if let Some(style) = parse_style_object(value.text) {
                        element.style = style;
                        return Some(span);
                    }
                }
                format!("{{{}}}", value.text)
            }
            Some(value) if key == "class" => normalize_class(&decode_entities(value.text)),
            Some(value) => decode_entities(value.text),
        };

        if key == "style" && raw.value.as_ref().is_some_and(|v| v.kind != ValueKind::Expression) {
            element.style = parse_declarations(&value);
        } else {
            element.attributes.insert(key, value);
        }
        Some(span)
    }
}

/// Character data split only by comments, normalized as one run
#[derive(Default)]
struct TextRun<'src> {
    pieces: Vec<(&'src str, usize)>,
}

impl<'src> TextRun<'src> {
    fn push(&mut self, raw: &'src str, start: usize) {
        self.pieces.push((raw, start));
    }

    fn flush(&mut self, flavor: Flavor, nodes: &mut Vec<(Node, SpanTree)>) {
        if self.pieces.is_empty() {
            return;
        }
        let pieces = std::mem::take(&mut self.pieces);
        let raw: String = pieces.iter().map(|(piece, _)| *piece).collect();
        let content = match flavor {
            Flavor::Html => normalize_html_text(&raw),
            Flavor::Jsx => normalize_jsx_text(&raw),
        };
        let Some(content) = content else {
            return;
        };

        let trimmed = |(piece, at): &(&str, usize)| {
            let range = trimmed_range(piece);
            (!range.is_empty()).then(|| at + range.start..at + range.end)
        };
        let first = pieces.iter().find_map(trimmed);
        let last = pieces.iter().rev().find_map(trimmed);
        let range = match (first, last) {
            (Some(first), Some(last)) => first.start..last.end,
            _ => pieces[0].1..pieces[0].1 + pieces[0].0.len(),
        };
        nodes.push((Node::text(content), SpanTree::text(range)));
    }
}

fn element_tree(span: ElementSpan, children: Vec<SpanTree>) -> SpanTree {
    SpanTree {
        span: NodeSpan::Element(span),
        children,
    }
}

/// Parse a whole markup text keeping byte spans
pub fn parse_document(source: &str, flavor: Flavor) -> ParseResult<ParsedDocument> {
    Parser::new(source, flavor).parse_document()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;

    fn parse_html(source: &str) -> Node {
        parse_document(source, Flavor::Html).unwrap().tree
    }

    #[test]
    fn test_parse_nested() {
        let tree = parse_html("<div><p>Hi</p></div>");
        assert_eq!(
            tree,
            Node::element("div").with_child(Node::element("p").with_child(Node::text("Hi")))
        );
    }

    #[test]
    fn test_style_attribute_goes_to_style_map() {
        let tree = parse_html(r#"<div class="card" style="color: red; margin: 0"></div>"#);
        let el = tree.as_element().unwrap();
        assert_eq!(el.attributes.get("class").map(String::as_str), Some("card"));
        assert!(!el.attributes.contains_key("style"));
        assert_eq!(el.style.get("color").map(String::as_str), Some("red"));
        assert_eq!(el.style.get("margin").map(String::as_str), Some("0"));
    }

    #[test]
    fn test_void_elements_are_childless() {
        let tree = parse_html(r#"<div><img src="a.png"><br><input type="text"/>tail</div>"#);
        let children = tree.children();
        assert_eq!(children.len(), 4);
        assert_eq!(children[0].tag(), Some("img"));
        assert!(children[0].children().is_empty());
        assert_eq!(children[2].tag(), Some("input"));
        assert_eq!(children[3].as_text(), Some("tail"));
    }

    #[test]
    fn test_self_closing_unknown_element() {
        let tree = parse_html("<section><my-widget/></section>");
        assert_eq!(tree.children()[0].tag(), Some("my-widget"));
    }

    #[test]
    fn test_multiple_top_level_nodes_get_synthetic_root() {
        let parsed = parse_document("<p>a</p>\n<p>b</p>", Flavor::Html).unwrap();
        assert!(parsed.tree.is_synthetic_root());
        assert_eq!(parsed.tree.children().len(), 2);
        let root = parsed.spans.element().unwrap();
        assert!(root.open_tag.is_none());
        assert_eq!(root.outer, 0..17);
    }

    #[test]
    fn test_mismatched_tag() {
        let err = parse_document("<div><p>Text</div>", Flavor::Html).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MismatchedTag);
        assert_eq!(err.position, 12);
    }

    #[test]
    fn test_close_without_open() {
        let err = parse_document("<p>a</p></div>", Flavor::Html).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MismatchedTag);
    }

    #[test]
    fn test_unclosed_tag() {
        let err = parse_document("<div><p>Text</p>", Flavor::Html).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnclosedTag);
        assert_eq!(err.position, 0);
    }

    #[test]
    fn test_spans() {
        let source = "<div id=\"a\">\n  <p>Hello</p>\n</div>";
        let parsed = parse_document(source, Flavor::Html).unwrap();
        let root = parsed.spans.element().unwrap();
        assert_eq!(root.outer, 0..source.len());
        assert_eq!(&source[root.open_tag.clone().unwrap()], "<div id=\"a\">");
        let id = root.attribute("id").unwrap();
        assert_eq!(&source[id.range.clone()], "id=\"a\"");
        assert_eq!(&source[id.value.clone().unwrap()], "\"a\"");

        let p = parsed.spans.get(&[0]).unwrap();
        assert_eq!(&source[p.outer()], "<p>Hello</p>");
        let text = parsed.spans.get(&[0, 0]).unwrap();
        assert_eq!(&source[text.outer()], "Hello");
    }

    #[test]
    fn test_text_split_by_comment_merges() {
        let tree = parse_html("<p>a <!-- x --> b</p>");
        assert_eq!(tree.children(), &[Node::text("a b")]);

        let parsed = parse_document("<p>ab<!-- x -->cd</p>", Flavor::Html).unwrap();
        assert_eq!(parsed.tree.children(), &[Node::text("abcd")]);
        assert_eq!(parsed.spans.get(&[0]).unwrap().outer(), 3..17);
    }

    #[test]
    fn test_raw_text_kept_verbatim() {
        let tree = parse_html("<script>\n  if (a < b) {}\n</script>");
        assert_eq!(tree.children(), &[Node::text("if (a < b) {}")]);
    }

    #[test]
    fn test_jsx_attributes_and_children() {
        let source = r#"<div className="box" style={{ fontSize: 12 }} onClick={() => go()}>{label}</div>"#;
        let tree = parse_document(source, Flavor::Jsx).unwrap().tree;
        let el = tree.as_element().unwrap();
        assert_eq!(el.attributes.get("class").map(String::as_str), Some("box"));
        assert_eq!(el.attributes.get("onClick").map(String::as_str), Some("{() => go()}"));
        assert_eq!(el.style.get("font-size").map(String::as_str), Some("12px"));
        assert_eq!(el.children, vec![Node::text("{label}")]);
    }

    #[test]
    fn test_jsx_dynamic_style_stays_an_attribute() {
        let tree = parse_document("<div style={styles.box} />", Flavor::Jsx).unwrap().tree;
        let el = tree.as_element().unwrap();
        assert_eq!(el.attributes.get("style").map(String::as_str), Some("{styles.box}"));
        assert!(el.style.is_empty());
    }

    #[test]
    fn test_root_element_stops_after_markup() {
        let source = "return (<div><br/></div>);\n}";
        let (parsed, end) = Parser::bounded(source, Flavor::Jsx, 8..source.len())
            .parse_root_element()
            .unwrap();
        assert_eq!(&source[8..end], "<div><br/></div>");
        assert_eq!(parsed.tree.children().len(), 1);
    }

    #[test]
    fn test_root_fragment_becomes_synthetic_root() {
        let source = "<><h1>A</h1><p>B</p></>";
        let (parsed, end) = Parser::new(source, Flavor::Jsx).parse_root_element().unwrap();
        assert_eq!(end, source.len());
        assert!(parsed.tree.is_synthetic_root());
        assert_eq!(parsed.spans.element().unwrap().inner, Some(2..source.len() - 3));
    }
}
