//! # Byte-range text patching
//!
//! Edits source text in place instead of reprinting it, so formatting,
//! comments and everything outside the touched nodes survive.
//!
//! ```text
//!   ParsedDocument ──▶ ShadowTree ──apply ops──▶ ShadowTree'
//!                        (nodes remember their spans)   │
//!                                                       ▼ derive
//!   source ◀── apply in descending start ◀── [TextEdit { range, replacement }]
//! ```
//!
//! Edits derived per node:
//!
//! - attribute changed: the attribute is rewritten in place
//! - attribute removed: its bytes and the whitespace before it go
//! - attributes added: inserted after the last attribute
//! - text changed: the text span is replaced
//! - child list changed: the range from the first to the last original
//!   child is re-rendered; kept children are copied verbatim (with their own
//!   nested edits) and new ones serialized at the detected indentation

use crate::dialect::FormatOptions;
use dragndrop_parser::spans::{ElementSpan, NodeSpan};
use dragndrop_parser::tree::is_raw_text_element;
use dragndrop_parser::serializer::is_expression;
use dragndrop_parser::text::{escape_jsx_text, escape_text};
use dragndrop_parser::{Element, Flavor, Node, ParsedDocument, Serializer, SpanTree};
use dragndrop_vdom::{AttributeDelta, EditOperation, NodePath, PatchError, PatchTarget};
use std::ops::Range;
use tracing::debug;

/// Replace `range` of the source with `replacement`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub replacement: String,
}

impl TextEdit {
    pub fn new(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }
}

/// Apply a batch of edits. Edits must be in bounds, on character boundaries
/// and must not overlap; they are applied from the highest start down.
pub fn apply_edits(source: &str, mut edits: Vec<TextEdit>) -> Result<String, PatchError> {
    edits.sort_by_key(|edit| (edit.range.start, edit.range.end));

    let mut previous_end = 0;
    for edit in &edits {
        let Range { start, end } = edit.range;
        let invalid = |reason: &str| PatchError::InvalidEdit {
            start,
            end,
            reason: reason.to_string(),
        };
        if start > end || end > source.len() {
            return Err(invalid("out of bounds"));
        }
        if !source.is_char_boundary(start) || !source.is_char_boundary(end) {
            return Err(invalid("not on a character boundary"));
        }
        if start < previous_end {
            return Err(invalid("overlaps a previous edit"));
        }
        previous_end = end;
    }

    let mut output = source.to_string();
    for edit in edits.iter().rev() {
        output.replace_range(edit.range.clone(), &edit.replacement);
    }
    Ok(output)
}

/// Patch `source` (whose span-preserving parse is `parsed`) with `ops`
pub fn patch_text(
    source: &str,
    parsed: &ParsedDocument,
    ops: &[EditOperation],
    flavor: Flavor,
    options: &FormatOptions,
) -> Result<String, PatchError> {
    let edits = text_edits(source, parsed, ops, flavor, options)?;
    debug!(operations = ops.len(), edits = edits.len(), %flavor, "Patching source text");
    apply_edits(source, edits)
}

/// Byte-range edits equivalent to `ops`
pub fn text_edits(
    source: &str,
    parsed: &ParsedDocument,
    ops: &[EditOperation],
    flavor: Flavor,
    options: &FormatOptions,
) -> Result<Vec<TextEdit>, PatchError> {
    let mut shadow = ShadowTree::new(parsed);
    shadow.apply_operations(ops)?;

    let writer = EditWriter {
        source,
        flavor,
        options,
    };
    let mut edits = Vec::new();
    writer.emit_root(&shadow.root, &parsed.spans, &mut edits)?;
    Ok(edits)
}

#[derive(Clone, Copy)]
struct Origin<'s> {
    node: &'s Node,
    span: &'s SpanTree,
}

/// Tree under edit. Nodes parsed from the source keep their origin; nodes
/// created by operations have none.
struct Shadow<'s> {
    origin: Option<Origin<'s>>,
    /// The node itself, children excluded
    node: Node,
    children: Vec<Shadow<'s>>,
}

impl<'s> Shadow<'s> {
    fn original(node: &'s Node, span: &'s SpanTree) -> Self {
        Self {
            origin: Some(Origin { node, span }),
            node: shallow(node),
            children: node
                .children()
                .iter()
                .zip(&span.children)
                .map(|(child, child_span)| Self::original(child, child_span))
                .collect(),
        }
    }

    fn fresh(node: &Node) -> Self {
        Self {
            origin: None,
            node: shallow(node),
            children: node.children().iter().map(Self::fresh).collect(),
        }
    }

    fn to_node(&self) -> Node {
        let mut node = self.node.clone();
        if let Node::Element(el) = &mut node {
            el.children = self.children.iter().map(Shadow::to_node).collect();
        }
        node
    }

    /// Whether the children are exactly the original children in order
    fn children_unchanged(&self, span: &SpanTree) -> bool {
        self.children.len() == span.children.len()
            && self
                .children
                .iter()
                .zip(&span.children)
                .all(|(child, original)| {
                    child
                        .origin
                        .is_some_and(|origin| std::ptr::eq(origin.span, original))
                })
    }
}

fn shallow(node: &Node) -> Node {
    match node {
        Node::Text(_) => node.clone(),
        Node::Element(el) => Node::Element(Element {
            tag: el.tag.clone(),
            attributes: el.attributes.clone(),
            style: el.style.clone(),
            children: Vec::new(),
        }),
    }
}

struct ShadowTree<'s> {
    root: Shadow<'s>,
}

impl<'s> ShadowTree<'s> {
    fn new(parsed: &'s ParsedDocument) -> Self {
        Self {
            root: Shadow::original(&parsed.tree, &parsed.spans),
        }
    }

    fn get_mut(&mut self, path: &NodePath) -> Result<&mut Shadow<'s>, PatchError> {
        let mut node = &mut self.root;
        for &index in path.indices() {
            node = node
                .children
                .get_mut(index)
                .ok_or_else(|| PatchError::UnresolvedPath(path.clone()))?;
        }
        Ok(node)
    }

    fn children_mut(&mut self, path: &NodePath) -> Result<&mut Vec<Shadow<'s>>, PatchError> {
        let node = self.get_mut(path)?;
        if !node.node.is_element() {
            return Err(PatchError::UnresolvedPath(path.clone()));
        }
        Ok(&mut node.children)
    }

    fn take(&mut self, path: &NodePath) -> Result<Shadow<'s>, PatchError> {
        let (parent, index) = path
            .split_last()
            .ok_or_else(|| PatchError::unsupported(path, "the document root cannot be detached"))?;
        let children = self.children_mut(&parent)?;
        if index >= children.len() {
            return Err(PatchError::UnresolvedPath(path.clone()));
        }
        Ok(children.remove(index))
    }

    fn put(&mut self, parent: &NodePath, index: usize, node: Shadow<'s>) -> Result<(), PatchError> {
        let children = self.children_mut(parent)?;
        if index > children.len() {
            return Err(PatchError::UnresolvedPath(parent.child(index)));
        }
        children.insert(index, node);
        Ok(())
    }
}

impl PatchTarget for ShadowTree<'_> {
    type Error = PatchError;

    fn insert(&mut self, parent: &NodePath, index: usize, node: &Node) -> Result<(), PatchError> {
        self.put(parent, index, Shadow::fresh(node))
    }

    fn remove(&mut self, path: &NodePath) -> Result<(), PatchError> {
        self.take(path).map(drop)
    }

    fn replace(&mut self, path: &NodePath, node: &Node) -> Result<(), PatchError> {
        *self.get_mut(path)? = Shadow::fresh(node);
        Ok(())
    }

    fn update_attributes(
        &mut self,
        path: &NodePath,
        attributes: &AttributeDelta,
        style: &AttributeDelta,
    ) -> Result<(), PatchError> {
        let element = self
            .get_mut(path)?
            .node
            .as_element_mut()
            .ok_or_else(|| PatchError::UnresolvedPath(path.clone()))?;
        attributes.apply_to(&mut element.attributes);
        style.apply_to(&mut element.style);
        Ok(())
    }

    fn update_text(&mut self, path: &NodePath, content: &str) -> Result<(), PatchError> {
        match &mut self.get_mut(path)?.node {
            Node::Text(text) => {
                text.content = content.to_string();
                Ok(())
            }
            Node::Element(_) => Err(PatchError::UnresolvedPath(path.clone())),
        }
    }

    fn move_node(
        &mut self,
        from: &NodePath,
        to_parent: &NodePath,
        to_index: usize,
    ) -> Result<(), PatchError> {
        let node = self.take(from)?;
        self.put(to_parent, to_index, node)
    }
}

/// Derives text edits from a patched shadow tree
struct EditWriter<'a> {
    source: &'a str,
    flavor: Flavor,
    options: &'a FormatOptions,
}

impl EditWriter<'_> {
    fn serializer(&self) -> Serializer {
        self.options.serializer(self.flavor)
    }

    fn emit_root(&self, root: &Shadow<'_>, spans: &SpanTree, edits: &mut Vec<TextEdit>) -> Result<(), PatchError> {
        match root.origin {
            Some(origin) => self.emit(root, origin, false, edits),
            None => {
                let range = match spans.children.as_slice() {
                    [first, .., last] if spans.element().is_some_and(|el| el.open_tag.is_none()) => {
                        first.outer().start..last.outer().end
                    }
                    [only] if spans.element().is_some_and(|el| el.open_tag.is_none()) => only.outer(),
                    _ => spans.outer(),
                };
                let indent = line_indent(self.source, range.start);
                edits.push(TextEdit::new(
                    range,
                    self.render_fresh(&root.to_node(), false, Some(indent)),
                ));
                Ok(())
            }
        }
    }

    fn emit(
        &self,
        shadow: &Shadow<'_>,
        origin: Origin<'_>,
        raw: bool,
        edits: &mut Vec<TextEdit>,
    ) -> Result<(), PatchError> {
        match (&shadow.node, &origin.span.span) {
            (Node::Text(text), NodeSpan::Text(range)) => {
                if origin.node.as_text() != Some(text.content.as_str()) {
                    edits.push(TextEdit::new(range.clone(), self.text(&text.content, raw)));
                }
                Ok(())
            }
            (Node::Element(current), NodeSpan::Element(span)) => {
                self.emit_element(shadow, current, origin, span, edits)
            }
            _ => {
                let range = origin.span.outer();
                Err(PatchError::InvalidEdit {
                    start: range.start,
                    end: range.end,
                    reason: "recorded span does not match the node".to_string(),
                })
            }
        }
    }

    fn emit_element(
        &self,
        shadow: &Shadow<'_>,
        current: &Element,
        origin: Origin<'_>,
        span: &ElementSpan,
        edits: &mut Vec<TextEdit>,
    ) -> Result<(), PatchError> {
        let children_changed = !shadow.children_unchanged(origin.span);

        let Some(inner) = span.inner.clone() else {
            if children_changed {
                // void or self-closing element that gained children
                let indent = line_indent(self.source, span.outer.start);
                edits.push(TextEdit::new(
                    span.outer.clone(),
                    self.render_fresh(&shadow.to_node(), false, Some(indent)),
                ));
            } else if let Some(original) = origin.node.as_element() {
                self.emit_attributes(original, current, span, edits);
            }
            return Ok(());
        };

        if span.open_tag.is_some() {
            if let Some(original) = origin.node.as_element() {
                self.emit_attributes(original, current, span, edits);
            }
        }

        let raw = self.flavor == Flavor::Html && is_raw_text_element(&current.tag);
        if children_changed {
            let replacement = self.render_children(shadow, origin.span, span, inner.clone(), raw)?;
            edits.push(replacement);
            return Ok(());
        }
        for child in &shadow.children {
            if let Some(child_origin) = child.origin {
                self.emit(child, child_origin, raw, edits)?;
            }
        }
        Ok(())
    }

    fn emit_attributes(
        &self,
        original: &Element,
        current: &Element,
        span: &ElementSpan,
        edits: &mut Vec<TextEdit>,
    ) {
        if original.attributes == current.attributes && original.style == current.style {
            return;
        }
        let serializer = self.serializer();
        let style_is_attribute = |el: &Element| el.attributes.contains_key("style");

        for attribute in &span.attributes {
            let key = attribute.key.as_str();
            if key == "style" && !style_is_attribute(original) {
                if current.style == original.style {
                    continue;
                }
                if current.style.is_empty() {
                    edits.push(self.removal(attribute.range.clone()));
                } else {
                    edits.push(TextEdit::new(
                        attribute.range.clone(),
                        serializer.style_attribute_text(&current.style),
                    ));
                }
                continue;
            }

            match current.attributes.get(key) {
                None => edits.push(self.removal(attribute.range.clone())),
                Some(value) if original.attributes.get(key) != Some(value) => {
                    edits.push(TextEdit::new(
                        attribute.range.clone(),
                        serializer.attribute_text(key, value),
                    ));
                }
                Some(_) => {}
            }
        }

        let mut added = String::new();
        for (name, value) in &current.attributes {
            if !original.attributes.contains_key(name) && span.attribute(name).is_none() {
                added.push(' ');
                added.push_str(&serializer.attribute_text(name, value));
            }
        }
        let style_written = span.attribute("style").is_some() && !style_is_attribute(original);
        if !current.style.is_empty() && !style_written {
            added.push(' ');
            added.push_str(&serializer.style_attribute_text(&current.style));
        }
        if !added.is_empty() {
            edits.push(TextEdit::new(span.attrs_end..span.attrs_end, added));
        }
    }

    /// Remove `range` and the whitespace in front of it
    fn removal(&self, range: Range<usize>) -> TextEdit {
        let before = &self.source[..range.start];
        let start = before.trim_end_matches(|c: char| c.is_ascii_whitespace()).len();
        TextEdit::new(start..range.end, "")
    }

    fn render_children(
        &self,
        shadow: &Shadow<'_>,
        spans: &SpanTree,
        span: &ElementSpan,
        inner: Range<usize>,
        raw: bool,
    ) -> Result<TextEdit, PatchError> {
        if shadow.children.is_empty() {
            return Ok(TextEdit::new(inner, ""));
        }

        let rendered = |child: &Shadow<'_>, indent: Option<&str>| -> Result<String, PatchError> {
            match child.origin {
                Some(origin) => self.render_retained(child, origin, raw),
                None => Ok(self.render_fresh(&child.to_node(), raw, indent)),
            }
        };

        if let (Some(first), Some(last)) = (spans.children.first(), spans.children.last()) {
            let range = first.outer().start..last.outer().end;
            let indent = indent_before(self.source, range.start);
            let separator = match spans.children.get(1) {
                Some(second)
                    if self.source[first.outer().end..second.outer().start]
                        .chars()
                        .all(|c| c.is_ascii_whitespace()) =>
                {
                    self.source[first.outer().end..second.outer().start].to_string()
                }
                _ => indent.map(|indent| format!("\n{indent}")).unwrap_or_default(),
            };

            let parts = shadow
                .children
                .iter()
                .map(|child| rendered(child, indent))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(TextEdit::new(range, parts.join(&separator)));
        }

        // the element had no children
        let multiline = match self.flavor {
            Flavor::Html => shadow.children.iter().any(|c| c.node.is_element()),
            Flavor::Jsx => shadow.children.iter().all(|c| c.node.is_element()),
        };
        if !multiline {
            let parts = shadow
                .children
                .iter()
                .map(|child| rendered(child, None))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(TextEdit::new(inner, parts.concat()));
        }

        let document_level = span.open_tag.is_none() && inner.start == 0;
        let parent_indent = line_indent(self.source, span.outer.start);
        let child_indent = if document_level {
            parent_indent.to_string()
        } else {
            format!("{parent_indent}{}", self.options.indent_unit())
        };
        let parts = shadow
            .children
            .iter()
            .map(|child| rendered(child, Some(&child_indent)))
            .collect::<Result<Vec<_>, _>>()?;
        let body = parts.join(&format!("\n{child_indent}"));
        let replacement = if document_level {
            body
        } else {
            format!("\n{child_indent}{body}\n{parent_indent}")
        };
        Ok(TextEdit::new(inner, replacement))
    }

    /// Original bytes of a kept node with its own edits applied
    fn render_retained(&self, shadow: &Shadow<'_>, origin: Origin<'_>, raw: bool) -> Result<String, PatchError> {
        let range = origin.span.outer();
        let mut nested = Vec::new();
        self.emit(shadow, origin, raw, &mut nested)?;
        let shifted = nested
            .into_iter()
            .map(|edit| TextEdit::new(edit.range.start - range.start..edit.range.end - range.start, edit.replacement))
            .collect();
        apply_edits(&self.source[range], shifted)
    }

    /// Serialize a new node to be placed on a line indented by `indent`
    fn render_fresh(&self, node: &Node, raw: bool, indent: Option<&str>) -> String {
        let text = match node {
            Node::Text(text) => self.text(&text.content, raw),
            Node::Element(_) => self.serializer().serialize(node),
        };
        match indent {
            Some(indent) if !indent.is_empty() => text.replace('\n', &format!("\n{indent}")),
            _ => text,
        }
    }

    fn text(&self, content: &str, raw: bool) -> String {
        match self.flavor {
            _ if raw => content.to_string(),
            Flavor::Html => escape_text(content),
            Flavor::Jsx if is_expression(content) => content.to_string(),
            Flavor::Jsx => escape_jsx_text(content),
        }
    }
}

/// Whitespace between the start of the line and `pos`, if nothing else is there
fn indent_before(source: &str, pos: usize) -> Option<&str> {
    let line_start = source[..pos].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &source[line_start..pos];
    prefix
        .chars()
        .all(|c| c == ' ' || c == '\t')
        .then_some(prefix)
}

/// Leading whitespace of the line containing `pos`
fn line_indent(source: &str, pos: usize) -> &str {
    let line_start = source[..pos].rfind('\n').map_or(0, |i| i + 1);
    let line = &source[line_start..];
    let body = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - body.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use dragndrop_parser::{parse_document, parse_jsx_document};
    use dragndrop_vdom::diff;

    /// Patch `source` towards `target` and check the result parses to it
    fn patch_to(source: &str, target: &Node, flavor: Flavor) -> String {
        let parsed = match flavor {
            Flavor::Html => parse_document(source, flavor).unwrap(),
            Flavor::Jsx => parse_jsx_document(source).unwrap().parsed,
        };
        let ops = diff(&parsed.tree, target);
        let patched = patch_text(source, &parsed, &ops, flavor, &FormatOptions::default()).unwrap();
        let reparsed = match flavor {
            Flavor::Html => parse_document(&patched, flavor).unwrap().tree,
            Flavor::Jsx => parse_jsx_document(&patched).unwrap().parsed.tree,
        };
        assert_eq!(&reparsed, target, "patched:\n{patched}");
        patched
    }

    fn html(source: &str) -> Node {
        parse_document(source, Flavor::Html).unwrap().tree
    }

    #[test]
    fn test_apply_edits_descending() {
        let out = apply_edits(
            "hello world",
            vec![TextEdit::new(0..5, "goodbye"), TextEdit::new(6..11, "moon")],
        )
        .unwrap();
        assert_eq!(out, "goodbye moon");
    }

    #[test]
    fn test_overlapping_edits_are_rejected() {
        let err = apply_edits(
            "abcdef",
            vec![TextEdit::new(0..4, "x"), TextEdit::new(2..5, "y")],
        )
        .unwrap_err();
        assert!(matches!(err, PatchError::InvalidEdit { start: 2, end: 5, .. }));
        assert!(apply_edits("abc", vec![TextEdit::new(2..9, "")]).is_err());
    }

    #[test]
    fn test_attribute_change_keeps_surroundings() {
        let source = "<!-- hero -->\n<div   class='a'  id=x>\n    <p>Hi</p>\n</div>\n";
        let target = html("<div class=\"b\" id=\"x\"><p>Hi</p></div>");
        let patched = patch_to(source, &target, Flavor::Html);
        assert_eq!(patched, "<!-- hero -->\n<div   class=\"b\"  id=x>\n    <p>Hi</p>\n</div>\n");
    }

    #[test]
    fn test_attribute_add_and_remove() {
        let source = "<a href=\"/\" title=\"t\">x</a>";
        let target = html("<a href=\"/\" target=\"_blank\">x</a>");
        assert_eq!(
            patch_to(source, &target, Flavor::Html),
            "<a href=\"/\" target=\"_blank\">x</a>"
        );
    }

    #[test]
    fn test_style_rewrite() {
        let source = "<div style=\"color: red\"></div>";
        let target = html("<div style=\"color: blue; margin: 0\"></div>");
        assert_eq!(
            patch_to(source, &target, Flavor::Html),
            "<div style=\"color: blue; margin: 0\"></div>"
        );
        assert_eq!(patch_to(source, &html("<div></div>"), Flavor::Html), "<div></div>");
    }

    #[test]
    fn test_text_change() {
        let source = "<p>\n  Old   text\n</p>";
        let target = html("<p>New &amp; shiny</p>");
        assert_eq!(
            patch_to(source, &target, Flavor::Html),
            "<p>\n  New &amp; shiny\n</p>"
        );
    }

    #[test]
    fn test_insert_child_uses_sibling_layout() {
        let source = "<ul>\n    <li id=\"a\">A</li>\n    <li id=\"b\">B</li>\n</ul>\n";
        let target = html("<ul><li id=\"a\">A</li><li id=\"n\">N</li><li id=\"b\">B</li></ul>");
        assert_eq!(
            patch_to(source, &target, Flavor::Html),
            "<ul>\n    <li id=\"a\">A</li>\n    <li id=\"n\">N</li>\n    <li id=\"b\">B</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_reorder_keeps_child_bytes() {
        let source = "<ul>\n  <li id=\"a\"  data-x = 'y'>A</li>\n  <li id=\"b\">B</li>\n</ul>";
        let target = html("<ul><li id=\"b\">B!</li><li id=\"a\" data-x=\"y\">A</li></ul>");
        assert_eq!(
            patch_to(source, &target, Flavor::Html),
            "<ul>\n  <li id=\"b\">B!</li>\n  <li id=\"a\"  data-x = 'y'>A</li>\n</ul>"
        );
    }

    #[test]
    fn test_first_child_in_empty_element() {
        let source = "<section>\n  <div class=\"card\"></div>\n</section>";
        let target = html("<section><div class=\"card\"><h2>Title</h2></div></section>");
        assert_eq!(
            patch_to(source, &target, Flavor::Html),
            "<section>\n  <div class=\"card\">\n    <h2>Title</h2>\n  </div>\n</section>"
        );
    }

    #[test]
    fn test_remove_all_children() {
        let source = "<div>\n  <p>a</p>\n  <p>b</p>\n</div>";
        assert_eq!(patch_to(source, &html("<div></div>"), Flavor::Html), "<div></div>");
    }

    #[test]
    fn test_root_replace() {
        let source = "<!doctype html>\n<main></main>\n";
        let target = html("<section><h1>New</h1></section>");
        assert_eq!(
            patch_to(source, &target, Flavor::Html),
            "<!doctype html>\n<section>\n  <h1>New</h1>\n</section>\n"
        );
    }

    #[test]
    fn test_jsx_attribute_and_text() {
        let source = "export default function Card() {\n  return (\n    <div className=\"card\" onClick={open}>\n      <h2>{title}</h2>\n      <p>Old</p>\n    </div>\n  );\n}\n";
        let target = Node::element("div")
            .with_attr("class", "card active")
            .with_attr("onClick", "{open}")
            .with_child(Node::element("h2").with_child(Node::text("{title}")))
            .with_child(Node::element("p").with_child(Node::text("New")))
            .with_child(Node::element("img").with_attr("src", "a.png"));
        assert_eq!(
            patch_to(source, &target, Flavor::Jsx),
            "export default function Card() {\n  return (\n    <div className=\"card active\" onClick={open}>\n      <h2>{title}</h2>\n      <p>New</p>\n      <img src=\"a.png\" />\n    </div>\n  );\n}\n"
        );
    }

    #[test]
    fn test_unresolved_path() {
        let source = "<div></div>";
        let parsed = parse_document(source, Flavor::Html).unwrap();
        let ops = [EditOperation::Remove {
            path: NodePath::new(vec![0]),
        }];
        let err = patch_text(source, &parsed, &ops, Flavor::Html, &FormatOptions::default()).unwrap_err();
        assert_eq!(err, PatchError::UnresolvedPath(NodePath::new(vec![0])));
    }
}
