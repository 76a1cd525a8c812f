//! # Visual Tree Adapter
//!
//! Reads the live canvas back into a Document Tree shaped exactly like the
//! one the markup parser produces for the same markup:
//!
//! ```text
//!   container ─┬─ <div class="hero selected">      →  <div class="hero">
//!              │    ├─ <button class="delete-btn"> →  (dropped)
//!              │    └─ "  Hello  "                 →  "Hello"
//!              └─ <!-- comment -->                 →  (dropped)
//! ```
//!
//! Editor decoration is removed using an [`ArtifactFilter`].

use crate::live::{LiveKind, LiveTree};
use dragndrop_parser::serializer::is_expression;
use dragndrop_parser::style::parse_declarations;
use dragndrop_parser::text::{collapse_whitespace, jsx_whitespace, normalize_class, trimmed_range};
use dragndrop_parser::tree::is_raw_text_element;
use dragndrop_parser::{Element, Flavor, Node};
use serde::{Deserialize, Serialize};

/// Identifies editor-only decoration in the live tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtifactFilter {
    /// Classes removed from otherwise kept elements
    pub strip_classes: Vec<String>,
    /// Elements carrying one of these classes are dropped entirely
    pub strip_element_classes: Vec<String>,
    pub strip_attributes: Vec<String>,
    /// Elements carrying this attribute are dropped entirely
    pub marker_attribute: String,
}

impl Default for ArtifactFilter {
    fn default() -> Self {
        let owned = |names: &[&str]| names.iter().map(|n| n.to_string()).collect();
        Self {
            strip_classes: owned(&[
                "selected",
                "multi-selected",
                "canvas-element",
                "dragging",
                "drag-over",
            ]),
            strip_element_classes: owned(&["delete-btn", "resize-handle", "selection-outline"]),
            strip_attributes: owned(&["contenteditable", "draggable", "data-component-type"]),
            marker_attribute: "data-editor-ui".to_string(),
        }
    }
}

impl ArtifactFilter {
    /// Whether `node` is an editor affordance rather than document content
    pub fn is_artifact<L: LiveTree>(&self, live: &L, node: L::Handle) -> bool {
        if live.kind(node) != LiveKind::Element {
            return false;
        }
        let attributes = live.attributes(node);
        attributes.iter().any(|(name, value)| {
            *name == self.marker_attribute
                || (name == "class"
                    && value
                        .split_ascii_whitespace()
                        .any(|class| self.strip_element_classes.iter().any(|c| c == class)))
        })
    }

    pub fn strips_attribute(&self, name: &str) -> bool {
        self.strip_attributes.iter().any(|a| a == name)
    }

    pub fn strips_class(&self, class: &str) -> bool {
        self.strip_classes.iter().any(|c| c == class)
    }

    /// Class list without editor classes, normalized like the parser does.
    /// `None` only when stripping editor classes left nothing.
    pub fn clean_class(&self, value: &str) -> Option<String> {
        if is_expression(value) {
            return Some(value.to_string());
        }
        let normalized = normalize_class(value);
        if self.editor_classes(&normalized).is_empty() {
            return Some(normalized);
        }
        let kept: Vec<&str> = normalized
            .split(' ')
            .filter(|class| !self.strips_class(class))
            .collect();
        (!kept.is_empty()).then(|| kept.join(" "))
    }

    /// Editor classes present in a class list
    pub fn editor_classes<'a>(&self, value: &'a str) -> Vec<&'a str> {
        value
            .split_ascii_whitespace()
            .filter(|class| self.strips_class(class))
            .collect()
    }
}

/// Live tree → Document Tree
#[derive(Debug, Clone, Default)]
pub struct Adapter {
    filter: ArtifactFilter,
    flavor: Flavor,
}

impl Adapter {
    pub fn new(filter: ArtifactFilter, flavor: Flavor) -> Self {
        Self { filter, flavor }
    }

    pub fn filter(&self) -> &ArtifactFilter {
        &self.filter
    }

    pub fn adapt<L: LiveTree>(&self, live: &L) -> Node {
        let top_level = self.adapt_children(live, live.root(), false);
        Node::from_top_level(top_level)
    }

    fn adapt_element<L: LiveTree>(&self, live: &L, node: L::Handle) -> Node {
        let tag = live.tag(node).unwrap_or_default();
        let mut element = Element::new(tag);

        for (name, value) in live.attributes(node) {
            if self.filter.strips_attribute(&name) || element.attributes.contains_key(&name) {
                continue;
            }
            match name.as_str() {
                "class" => {
                    if let Some(class) = self.filter.clean_class(&value) {
                        element.attributes.insert(name, class);
                    }
                }
                "style" if !is_expression(&value) => {
                    element.style = parse_declarations(&value);
                }
                _ => {
                    element.attributes.insert(name, value);
                }
            }
        }

        let raw = is_raw_text_element(&element.tag);
        element.children = self.adapt_children(live, node, raw);
        Node::Element(element)
    }

    fn adapt_children<L: LiveTree>(&self, live: &L, parent: L::Handle, raw: bool) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut run = String::new();

        for child in live.children(parent) {
            match live.kind(child) {
                LiveKind::Comment => {}
                LiveKind::Text => {
                    let content = live.text_content(child).unwrap_or_default();
                    if self.flavor == Flavor::Jsx && !raw {
                        nodes.extend(jsx_whitespace(&content).map(Node::text));
                    } else {
                        run.push_str(&content);
                    }
                }
                LiveKind::Element if self.filter.is_artifact(live, child) => {}
                LiveKind::Element => {
                    self.flush_text(&mut run, raw, &mut nodes);
                    nodes.push(self.adapt_element(live, child));
                }
            }
        }
        self.flush_text(&mut run, raw, &mut nodes);
        nodes
    }

    fn flush_text(&self, run: &mut String, raw: bool, nodes: &mut Vec<Node>) {
        if run.is_empty() {
            return;
        }
        let text = std::mem::take(run);
        if raw {
            let range = trimmed_range(&text);
            if !range.is_empty() {
                nodes.push(Node::text(&text[range]));
            }
        } else if let Some(collapsed) = collapse_whitespace(&text) {
            nodes.push(Node::text(collapsed));
        }
    }
}

/// Adapt with the default filter
pub fn adapt<L: LiveTree>(live: &L, flavor: Flavor) -> Node {
    Adapter::new(ArtifactFilter::default(), flavor).adapt(live)
}
