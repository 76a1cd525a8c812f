//! # Live visual tree
//!
//! The canvas the user edits is a mutable tree owned by the host (a browser
//! DOM, a native view tree, ...). The engine only talks to it through two
//! capability traits:
//!
//! ```text
//!   LiveTree     read:   root, kind, tag, children, attributes, text
//!   LiveTreeMut  write:  create, insert_before, detach, set/remove attribute, set_text
//! ```
//!
//! The live root is the canvas container. Its children are the top-level
//! nodes of the document plus whatever decoration the editor adds.
//!
//! [`HeadlessDom`] is an arena-backed implementation for tests and for
//! in-process editors.

use crate::error::PatchError;
use dragndrop_parser::style::format_declarations;
use dragndrop_parser::{parse_document, Flavor, Node, ParseResult};
use indexmap::IndexMap;
use std::fmt::Debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveKind {
    Element,
    Text,
    Comment,
}

pub trait LiveTree {
    type Handle: Copy + Eq + Debug;

    /// The canvas container
    fn root(&self) -> Self::Handle;

    fn kind(&self, node: Self::Handle) -> LiveKind;

    /// Tag name of an element node
    fn tag(&self, node: Self::Handle) -> Option<String>;

    fn children(&self, node: Self::Handle) -> Vec<Self::Handle>;

    /// Attributes of an element node in document order
    fn attributes(&self, node: Self::Handle) -> Vec<(String, String)>;

    /// Character data of a text or comment node
    fn text_content(&self, node: Self::Handle) -> Option<String>;

    fn attribute(&self, node: Self::Handle, name: &str) -> Option<String> {
        self.attributes(node)
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

pub trait LiveTreeMut: LiveTree {
    /// Build a detached subtree for `node`. The style map becomes a `style`
    /// attribute.
    fn create(&mut self, node: &Node) -> Result<Self::Handle, PatchError>;

    /// Insert `child` under `parent` before `before` (append when `None`),
    /// detaching it from its current parent first
    fn insert_before(
        &mut self,
        parent: Self::Handle,
        child: Self::Handle,
        before: Option<Self::Handle>,
    ) -> Result<(), PatchError>;

    fn detach(&mut self, node: Self::Handle) -> Result<(), PatchError>;

    fn set_attribute(&mut self, node: Self::Handle, name: &str, value: &str) -> Result<(), PatchError>;

    fn remove_attribute(&mut self, node: Self::Handle, name: &str) -> Result<(), PatchError>;

    fn set_text(&mut self, node: Self::Handle, content: &str) -> Result<(), PatchError>;
}

/// Handle into a [`HeadlessDom`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum DomData {
    Element {
        tag: String,
        attributes: IndexMap<String, String>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct DomNode {
    data: DomData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory live tree. Detached nodes stay in the arena.
#[derive(Debug, Clone)]
pub struct HeadlessDom {
    nodes: Vec<DomNode>,
    root: NodeId,
}

impl Default for HeadlessDom {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDom {
    /// Empty canvas container
    pub fn new() -> Self {
        let container = DomNode {
            data: DomData::Element {
                tag: "body".to_string(),
                attributes: IndexMap::new(),
            },
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![container],
            root: NodeId(0),
        }
    }

    /// Canvas showing `tree`
    pub fn from_tree(tree: &Node) -> Self {
        let mut dom = Self::new();
        dom.mount(tree);
        dom
    }

    /// Canvas showing an HTML snippet
    pub fn from_markup(html: &str) -> ParseResult<Self> {
        let parsed = parse_document(html, Flavor::Html)?;
        Ok(Self::from_tree(&parsed.tree))
    }

    /// Replace the container's content with the top-level nodes of `tree`
    pub fn mount(&mut self, tree: &Node) {
        let root = self.root;
        for child in std::mem::take(&mut self.nodes[root.0].children) {
            self.nodes[child.0].parent = None;
        }
        for node in tree.top_level() {
            let handle = self.build(node);
            self.link(root, handle, None);
        }
    }

    pub fn append_comment(&mut self, parent: NodeId, content: &str) -> NodeId {
        let handle = self.alloc(DomData::Comment(content.to_string()));
        self.link(parent, handle, None);
        handle
    }

    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let handle = self.alloc(DomData::Element {
            tag: tag.to_string(),
            attributes: IndexMap::new(),
        });
        self.link(parent, handle, None);
        handle
    }

    pub fn append_text(&mut self, parent: NodeId, content: &str) -> NodeId {
        let handle = self.alloc(DomData::Text(content.to_string()));
        self.link(parent, handle, None);
        handle
    }

    /// First element in document order whose `name` attribute equals `value`
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(handle) = stack.pop() {
            if let DomData::Element { attributes, .. } = &self.nodes[handle.0].data {
                if attributes.get(name).is_some_and(|v| v == value) {
                    return Some(handle);
                }
            }
            stack.extend(self.nodes[handle.0].children.iter().rev());
        }
        None
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    fn alloc(&mut self, data: DomData) -> NodeId {
        self.nodes.push(DomNode {
            data,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    fn build(&mut self, node: &Node) -> NodeId {
        match node {
            Node::Text(text) => self.alloc(DomData::Text(text.content.clone())),
            Node::Element(el) => {
                let mut attributes = el.attributes.clone();
                if !el.style.is_empty() {
                    attributes.insert("style".to_string(), format_declarations(&el.style));
                }
                let handle = self.alloc(DomData::Element {
                    tag: el.tag.clone(),
                    attributes,
                });
                for child in &el.children {
                    let child = self.build(child);
                    self.link(handle, child, None);
                }
                handle
            }
        }
    }

    fn link(&mut self, parent: NodeId, child: NodeId, at: Option<usize>) {
        let children = &mut self.nodes[parent.0].children;
        match at {
            Some(index) => children.insert(index, child),
            None => children.push(child),
        }
        self.nodes[child.0].parent = Some(parent);
    }

    fn unlink(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    fn node(&self, handle: NodeId) -> Result<&DomNode, PatchError> {
        self.nodes
            .get(handle.0)
            .ok_or_else(|| PatchError::Live(format!("unknown node {}", handle.0)))
    }

    fn attributes_mut(&mut self, handle: NodeId) -> Result<&mut IndexMap<String, String>, PatchError> {
        match self.nodes.get_mut(handle.0).map(|n| &mut n.data) {
            Some(DomData::Element { attributes, .. }) => Ok(attributes),
            Some(_) => Err(PatchError::Live(format!("node {} is not an element", handle.0))),
            None => Err(PatchError::Live(format!("unknown node {}", handle.0))),
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes[node.0].parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }
}

impl LiveTree for HeadlessDom {
    type Handle = NodeId;

    fn root(&self) -> NodeId {
        self.root
    }

    fn kind(&self, node: NodeId) -> LiveKind {
        match self.nodes.get(node.0).map(|n| &n.data) {
            Some(DomData::Element { .. }) | None => LiveKind::Element,
            Some(DomData::Text(_)) => LiveKind::Text,
            Some(DomData::Comment(_)) => LiveKind::Comment,
        }
    }

    fn tag(&self, node: NodeId) -> Option<String> {
        match &self.nodes.get(node.0)?.data {
            DomData::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        match self.nodes.get(node.0).map(|n| &n.data) {
            Some(DomData::Element { attributes, .. }) => attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn text_content(&self, node: NodeId) -> Option<String> {
        match &self.nodes.get(node.0)?.data {
            DomData::Text(text) | DomData::Comment(text) => Some(text.clone()),
            DomData::Element { .. } => None,
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        match &self.nodes.get(node.0)?.data {
            DomData::Element { attributes, .. } => attributes.get(name).cloned(),
            _ => None,
        }
    }
}

impl LiveTreeMut for HeadlessDom {
    fn create(&mut self, node: &Node) -> Result<NodeId, PatchError> {
        Ok(self.build(node))
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> Result<(), PatchError> {
        self.node(parent)?;
        self.node(child)?;
        if self.is_ancestor(child, parent) {
            return Err(PatchError::Live(format!(
                "node {} cannot be inserted into its own subtree",
                child.0
            )));
        }
        self.unlink(child);
        let at = match before {
            None => None,
            Some(anchor) => Some(
                self.nodes[parent.0]
                    .children
                    .iter()
                    .position(|&c| c == anchor)
                    .ok_or_else(|| {
                        PatchError::Live(format!("node {} is not a child of {}", anchor.0, parent.0))
                    })?,
            ),
        };
        self.link(parent, child, at);
        Ok(())
    }

    fn detach(&mut self, node: NodeId) -> Result<(), PatchError> {
        self.node(node)?;
        self.unlink(node);
        Ok(())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), PatchError> {
        self.attributes_mut(node)?
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), PatchError> {
        self.attributes_mut(node)?.shift_remove(name);
        Ok(())
    }

    fn set_text(&mut self, node: NodeId, content: &str) -> Result<(), PatchError> {
        match self.nodes.get_mut(node.0).map(|n| &mut n.data) {
            Some(DomData::Text(text)) | Some(DomData::Comment(text)) => {
                *text = content.to_string();
                Ok(())
            }
            _ => Err(PatchError::Live(format!("node {} is not a text node", node.0))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_builds_top_level_children() {
        let tree = Node::root(vec![
            Node::element("h1").with_child(Node::text("Title")),
            Node::element("p").with_style("color", "red"),
        ]);
        let dom = HeadlessDom::from_tree(&tree);
        let top = dom.children(dom.root());
        assert_eq!(top.len(), 2);
        assert_eq!(dom.tag(top[0]).as_deref(), Some("h1"));
        assert_eq!(dom.attribute(top[1], "style").as_deref(), Some("color: red"));
        let title = dom.children(top[0])[0];
        assert_eq!(dom.kind(title), LiveKind::Text);
        assert_eq!(dom.text_content(title).as_deref(), Some("Title"));
    }

    #[test]
    fn test_insert_before_moves_existing_node() {
        let mut dom = HeadlessDom::from_markup("<ul><li id=\"a\"></li><li id=\"b\"></li></ul>").unwrap();
        let list = dom.children(dom.root())[0];
        let a = dom.find_by_attribute("id", "a").unwrap();
        let b = dom.find_by_attribute("id", "b").unwrap();

        dom.insert_before(list, b, Some(a)).unwrap();
        assert_eq!(dom.children(list), vec![b, a]);
        assert_eq!(dom.parent(b), Some(list));
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut dom = HeadlessDom::from_markup("<div><section></section></div>").unwrap();
        let div = dom.children(dom.root())[0];
        let section = dom.children(div)[0];
        assert!(dom.insert_before(section, div, None).is_err());
    }

    #[test]
    fn test_attribute_mutation() {
        let mut dom = HeadlessDom::from_markup("<a href=\"/\">x</a>").unwrap();
        let a = dom.children(dom.root())[0];
        dom.set_attribute(a, "title", "home").unwrap();
        dom.remove_attribute(a, "href").unwrap();
        assert_eq!(dom.attributes(a), vec![("title".to_string(), "home".to_string())]);

        let text = dom.children(a)[0];
        assert!(dom.set_attribute(text, "x", "y").is_err());
        dom.set_text(text, "home").unwrap();
        assert_eq!(dom.text_content(text).as_deref(), Some("home"));
    }
}
