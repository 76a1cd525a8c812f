use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Tag of the synthetic wrapper used when a document has zero or several
/// top-level nodes. No markup dialect can produce a tag starting with `#`.
pub const ROOT_TAG: &str = "#root";

/// Ordered `name → value` map. Equality ignores order.
pub type AttributeMap = IndexMap<String, String>;

/// Ordered `property → value` map for inline styles.
pub type StyleMap = IndexMap<String, String>;

/// Document Tree node shared by the source and visual representations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Element(Element),
    Text(Text),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: AttributeMap,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub style: StyleMap,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub content: String,
}

impl Node {
    pub fn element(tag: impl Into<String>) -> Self {
        Node::Element(Element::new(tag))
    }

    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(Text {
            content: content.into(),
        })
    }

    /// Synthetic root wrapping `children`
    pub fn root(children: Vec<Node>) -> Self {
        Node::Element(Element {
            tag: ROOT_TAG.to_string(),
            attributes: AttributeMap::new(),
            style: StyleMap::new(),
            children,
        })
    }

    /// Wrap a list of top-level nodes: a single element stands on its own,
    /// anything else gets the synthetic root.
    pub fn from_top_level(mut nodes: Vec<Node>) -> Self {
        if nodes.len() == 1 && nodes[0].is_element() {
            if let Some(node) = nodes.pop() {
                return node;
            }
        }
        Node::root(nodes)
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Node::Element(ref mut el) = self {
            el.attributes.insert(name.into(), value.into());
        }
        self
    }

    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        if let Node::Element(ref mut el) = self {
            el.style.insert(property.into(), value.into());
        }
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        if let Node::Element(ref mut el) = self {
            el.children.push(child);
        }
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        if let Node::Element(ref mut el) = self {
            el.children.extend(children);
        }
        self
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(&text.content),
            Node::Element(_) => None,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        self.as_element().map(|el| el.tag.as_str())
    }

    pub fn key(&self) -> Option<&str> {
        self.as_element().and_then(Element::key)
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(el) => &el.children,
            Node::Text(_) => &[],
        }
    }

    pub fn is_synthetic_root(&self) -> bool {
        self.tag() == Some(ROOT_TAG)
    }

    /// Top-level nodes this tree stands for (inverse of `from_top_level`)
    pub fn top_level(&self) -> &[Node] {
        if self.is_synthetic_root() {
            self.children()
        } else {
            std::slice::from_ref(self)
        }
    }

    /// Resolve a child-index path from this node
    pub fn get(&self, path: &[usize]) -> Option<&Node> {
        path.iter()
            .try_fold(self, |node, &index| node.children().get(index))
    }

    pub fn get_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let mut node = self;
        for &index in path {
            node = match node {
                Node::Element(el) => el.children.get_mut(index)?,
                Node::Text(_) => return None,
            };
        }
        Some(node)
    }

    /// Number of nodes in the subtree, this one included
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Node::node_count).sum::<usize>()
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: AttributeMap::new(),
            style: StyleMap::new(),
            children: Vec::new(),
        }
    }

    /// Identity used by the differ: the `id` attribute, if any
    pub fn key(&self) -> Option<&str> {
        self.attributes.get("id").map(String::as_str)
    }
}

/// HTML void elements: never have children or a closing tag
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "param" | "source" | "track" | "wbr"
    )
}

/// Elements whose content is kept verbatim instead of being tokenized
pub fn is_raw_text_element(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "script" | "style" | "textarea" | "pre"
    )
}
