//! Applying edit operations to the live canvas.
//!
//! Document paths count *significant* live children only: editor artifacts,
//! comments and whitespace-only text are skipped during resolution and left
//! where they are. Text nodes are assumed to map one to one onto document
//! text, which holds for anything this patcher or [`render_full`] created.

use crate::adapter::ArtifactFilter;
use crate::apply::PatchTarget;
use crate::error::PatchError;
use crate::live::{LiveKind, LiveTree, LiveTreeMut};
use crate::operations::{AttributeDelta, EditOperation, NodePath};
use dragndrop_parser::serializer::is_expression;
use dragndrop_parser::style::{format_declarations, parse_declarations};
use dragndrop_parser::Node;
use tracing::{debug, trace};

pub struct VisualPatcher<'a, L: LiveTreeMut> {
    live: &'a mut L,
    filter: &'a ArtifactFilter,
    /// Whether the document root is the canvas container itself
    synthetic_root: bool,
}

impl<'a, L: LiveTreeMut> VisualPatcher<'a, L> {
    /// `current` is the tree the live canvas shows before the batch
    pub fn new(live: &'a mut L, filter: &'a ArtifactFilter, current: &Node) -> Self {
        Self {
            live,
            filter,
            synthetic_root: current.is_synthetic_root(),
        }
    }

    fn significant_children(&self, parent: L::Handle) -> Vec<L::Handle> {
        significant_children(&*self.live, self.filter, parent)
    }

    fn document_root(&self) -> Result<L::Handle, PatchError> {
        let container = self.live.root();
        if self.synthetic_root {
            return Ok(container);
        }
        self.significant_children(container)
            .into_iter()
            .find(|&child| self.live.kind(child) == LiveKind::Element)
            .ok_or(PatchError::UnresolvedPath(NodePath::root()))
    }

    fn resolve(&self, path: &NodePath) -> Result<L::Handle, PatchError> {
        let mut node = self.document_root()?;
        for &index in path.indices() {
            node = self
                .significant_children(node)
                .get(index)
                .copied()
                .ok_or_else(|| PatchError::UnresolvedPath(path.clone()))?;
        }
        Ok(node)
    }

    /// Handle of the child at `index` of `parent`, `None` for the end of the list
    fn anchor(&self, parent: L::Handle, index: usize, path: &NodePath) -> Result<Option<L::Handle>, PatchError> {
        let children = self.significant_children(parent);
        if index > children.len() {
            return Err(PatchError::UnresolvedPath(path.child(index)));
        }
        Ok(children.get(index).copied())
    }

    fn replace_document(&mut self, node: &Node) -> Result<(), PatchError> {
        render_full(&mut *self.live, self.filter, node)?;
        self.synthetic_root = node.is_synthetic_root();
        Ok(())
    }

    fn update_class(&mut self, node: L::Handle, value: Option<&str>) -> Result<(), PatchError> {
        let current = self.live.attribute(node, "class").unwrap_or_default();
        let mut classes: Vec<&str> = value.map(|v| v.split_ascii_whitespace().collect()).unwrap_or_default();
        for editor_class in self.filter.editor_classes(&current) {
            if !classes.contains(&editor_class) {
                classes.push(editor_class);
            }
        }
        if classes.is_empty() {
            self.live.remove_attribute(node, "class")
        } else {
            self.live.set_attribute(node, "class", &classes.join(" "))
        }
    }

    fn update_style(&mut self, node: L::Handle, delta: &AttributeDelta) -> Result<(), PatchError> {
        let current = self.live.attribute(node, "style").unwrap_or_default();
        if is_expression(&current) {
            return Ok(());
        }
        let mut style = parse_declarations(&current);
        delta.apply_to(&mut style);
        if style.is_empty() {
            self.live.remove_attribute(node, "style")
        } else {
            self.live.set_attribute(node, "style", &format_declarations(&style))
        }
    }
}

impl<L: LiveTreeMut> PatchTarget for VisualPatcher<'_, L> {
    type Error = PatchError;

    fn insert(&mut self, parent: &NodePath, index: usize, node: &Node) -> Result<(), PatchError> {
        let parent_handle = self.resolve(parent)?;
        let before = self.anchor(parent_handle, index, parent)?;
        let created = self.live.create(node)?;
        self.live.insert_before(parent_handle, created, before)
    }

    fn remove(&mut self, path: &NodePath) -> Result<(), PatchError> {
        if path.is_root() {
            return Err(PatchError::unsupported(path, "the document root cannot be removed"));
        }
        let node = self.resolve(path)?;
        self.live.detach(node)
    }

    fn replace(&mut self, path: &NodePath, node: &Node) -> Result<(), PatchError> {
        if path.is_root() {
            return self.replace_document(node);
        }
        let old = self.resolve(path)?;
        let Some((parent, _)) = path.split_last() else {
            return Err(PatchError::UnresolvedPath(path.clone()));
        };
        let parent_handle = self.resolve(&parent)?;
        let created = self.live.create(node)?;
        self.live.insert_before(parent_handle, created, Some(old))?;
        self.live.detach(old)
    }

    fn update_attributes(
        &mut self,
        path: &NodePath,
        attributes: &AttributeDelta,
        style: &AttributeDelta,
    ) -> Result<(), PatchError> {
        let node = self.resolve(path)?;
        if self.live.kind(node) != LiveKind::Element {
            return Err(PatchError::UnresolvedPath(path.clone()));
        }

        for name in &attributes.removed {
            if name == "class" {
                self.update_class(node, None)?;
            } else {
                self.live.remove_attribute(node, name)?;
            }
        }
        for (name, value) in attributes.assignments() {
            if name == "class" {
                self.update_class(node, Some(value))?;
            } else {
                self.live.set_attribute(node, name, value)?;
            }
        }
        if !style.is_empty() {
            self.update_style(node, style)?;
        }
        Ok(())
    }

    fn update_text(&mut self, path: &NodePath, content: &str) -> Result<(), PatchError> {
        let node = self.resolve(path)?;
        self.live.set_text(node, content)
    }

    fn move_node(
        &mut self,
        from: &NodePath,
        to_parent: &NodePath,
        to_index: usize,
    ) -> Result<(), PatchError> {
        let node = self.resolve(from)?;
        self.live.detach(node)?;
        let parent_handle = self.resolve(to_parent)?;
        let before = self.anchor(parent_handle, to_index, to_parent)?;
        self.live.insert_before(parent_handle, node, before)
    }
}

/// Children of `parent` that stand for document nodes
pub fn significant_children<L: LiveTree>(
    live: &L,
    filter: &ArtifactFilter,
    parent: L::Handle,
) -> Vec<L::Handle> {
    live.children(parent)
        .into_iter()
        .filter(|&child| match live.kind(child) {
            LiveKind::Comment => false,
            LiveKind::Text => live
                .text_content(child)
                .is_some_and(|text| !text.trim().is_empty()),
            LiveKind::Element => !filter.is_artifact(live, child),
        })
        .collect()
}

/// Patch the live canvas showing `current` with `ops`
pub fn patch_visual<L: LiveTreeMut>(
    live: &mut L,
    filter: &ArtifactFilter,
    current: &Node,
    ops: &[EditOperation],
) -> Result<(), PatchError> {
    debug!(operations = ops.len(), "Patching visual tree");
    VisualPatcher::new(live, filter, current).apply_operations(ops)
}

/// Rebuild the canvas content from `tree`, keeping editor decoration that
/// lives directly in the container
pub fn render_full<L: LiveTreeMut>(
    live: &mut L,
    filter: &ArtifactFilter,
    tree: &Node,
) -> Result<(), PatchError> {
    let container = live.root();
    for child in live.children(container) {
        if !filter.is_artifact(&*live, child) {
            live.detach(child)?;
        }
    }
    for node in tree.top_level() {
        let created = live.create(node)?;
        live.insert_before(container, created, None)?;
    }
    trace!(nodes = tree.node_count(), "Rendered visual tree");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Adapter;
    use crate::differ::diff;
    use crate::live::HeadlessDom;

    fn sync(before: &Node, after: &Node) -> HeadlessDom {
        let mut dom = HeadlessDom::from_tree(before);
        let ops = diff(before, after);
        patch_visual(&mut dom, &ArtifactFilter::default(), before, &ops).unwrap();
        dom
    }

    #[test]
    fn test_patch_matches_target_tree() {
        let before = Node::element("ul")
            .with_child(Node::element("li").with_attr("id", "a").with_child(Node::text("A")))
            .with_child(Node::element("li").with_attr("id", "b").with_child(Node::text("B")));
        let after = Node::element("ul")
            .with_attr("class", "list")
            .with_child(Node::element("li").with_attr("id", "b").with_child(Node::text("B2")))
            .with_child(Node::element("li").with_attr("id", "c"))
            .with_child(Node::element("li").with_attr("id", "a").with_child(Node::text("A")));

        let dom = sync(&before, &after);
        assert_eq!(Adapter::default().adapt(&dom), after);
    }

    #[test]
    fn test_artifacts_survive_patching() {
        let mut dom = HeadlessDom::from_markup(
            r#"<div class="card selected"><button class="delete-btn">x</button><p>Old</p></div>"#,
        )
        .unwrap();
        let filter = ArtifactFilter::default();
        let adapter = Adapter::default();
        let before = adapter.adapt(&dom);
        let after = Node::element("div")
            .with_attr("class", "card wide")
            .with_child(Node::element("p").with_child(Node::text("New")));

        patch_visual(&mut dom, &filter, &before, &diff(&before, &after)).unwrap();

        assert_eq!(adapter.adapt(&dom), after);
        assert!(dom.find_by_attribute("class", "delete-btn").is_some());
        let div = dom.children(dom.root())[0];
        assert_eq!(dom.attribute(div, "class").as_deref(), Some("card wide selected"));
    }

    #[test]
    fn test_style_delta_is_merged() {
        let before = Node::element("div").with_style("color", "red").with_style("margin", "0");
        let after = Node::element("div").with_style("color", "blue").with_style("margin", "0");
        let dom = sync(&before, &after);
        let div = dom.children(dom.root())[0];
        assert_eq!(dom.attribute(div, "style").as_deref(), Some("color: blue; margin: 0"));
    }

    #[test]
    fn test_root_replace_switches_wrapping() {
        let before = Node::element("div");
        let after = Node::root(vec![Node::element("h1"), Node::element("p")]);
        let dom = sync(&before, &after);
        assert_eq!(Adapter::default().adapt(&dom), after);
    }

    #[test]
    fn test_unresolved_path() {
        let mut dom = HeadlessDom::from_markup("<div></div>").unwrap();
        let tree = Node::element("div");
        let err = patch_visual(
            &mut dom,
            &ArtifactFilter::default(),
            &tree,
            &[EditOperation::UpdateText {
                path: NodePath::new(vec![3]),
                content: "x".into(),
            }],
        )
        .unwrap_err();
        assert_eq!(err, PatchError::UnresolvedPath(NodePath::new(vec![3])));
    }

    #[test]
    fn test_render_full_keeps_container_artifacts() {
        let mut dom = HeadlessDom::from_markup("<p>a</p>").unwrap();
        let overlay = dom.append_element(dom.root(), "div");
        dom.set_attribute(overlay, "data-editor-ui", "overlay").unwrap();

        let tree = Node::element("h1").with_child(Node::text("b"));
        render_full(&mut dom, &ArtifactFilter::default(), &tree).unwrap();

        assert_eq!(Adapter::default().adapt(&dom), tree);
        assert_eq!(dom.parent(overlay), Some(dom.root()));
    }
}
