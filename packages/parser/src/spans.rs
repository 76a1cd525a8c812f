//! Byte spans recorded at parse time, mirrored on the shape of the tree.

use crate::tree::Node;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpan {
    /// Document Tree key (`class` for a JSX `className`)
    pub key: String,
    /// Name start to value end
    pub range: Range<usize>,
    /// Value including quotes or braces
    pub value: Option<Range<usize>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpan {
    pub outer: Range<usize>,
    /// `<tag …>` up to and including `>`; `None` for a synthetic root
    pub open_tag: Option<Range<usize>>,
    /// Where a new attribute is inserted (end of the last attribute or tag name)
    pub attrs_end: usize,
    /// Content between the tags; `None` for void and self-closing elements
    pub inner: Option<Range<usize>>,
    pub attributes: Vec<AttributeSpan>,
}

impl ElementSpan {
    pub fn attribute(&self, key: &str) -> Option<&AttributeSpan> {
        self.attributes.iter().find(|attr| attr.key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSpan {
    Element(ElementSpan),
    /// Text content without surrounding whitespace
    Text(Range<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanTree {
    pub span: NodeSpan,
    pub children: Vec<SpanTree>,
}

impl SpanTree {
    pub fn text(range: Range<usize>) -> Self {
        Self {
            span: NodeSpan::Text(range),
            children: Vec::new(),
        }
    }

    pub fn get(&self, path: &[usize]) -> Option<&SpanTree> {
        path.iter()
            .try_fold(self, |tree, &index| tree.children.get(index))
    }

    pub fn element(&self) -> Option<&ElementSpan> {
        match &self.span {
            NodeSpan::Element(el) => Some(el),
            NodeSpan::Text(_) => None,
        }
    }

    /// Bytes covered by the node in the source
    pub fn outer(&self) -> Range<usize> {
        match &self.span {
            NodeSpan::Element(el) => el.outer.clone(),
            NodeSpan::Text(range) => range.clone(),
        }
    }
}

/// Result of the span-preserving parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub tree: Node,
    pub spans: SpanTree,
}

impl ParsedDocument {
    /// Apply the top-level wrapping rule to parsed nodes. `region` is the
    /// byte range the synthetic root stands for.
    pub fn from_top_level(nodes: Vec<(Node, SpanTree)>, region: Range<usize>) -> Self {
        let (nodes, spans): (Vec<_>, Vec<_>) = nodes.into_iter().unzip();
        let tree = Node::from_top_level(nodes);
        if !tree.is_synthetic_root() {
            if let Some(spans) = spans.into_iter().next() {
                return Self { tree, spans };
            }
            return Self {
                tree,
                spans: SpanTree::text(region),
            };
        }

        Self {
            tree,
            spans: SpanTree {
                span: NodeSpan::Element(ElementSpan {
                    outer: region.clone(),
                    open_tag: None,
                    attrs_end: region.start,
                    inner: Some(region),
                    attributes: Vec::new(),
                }),
                children: spans,
            },
        }
    }
}
