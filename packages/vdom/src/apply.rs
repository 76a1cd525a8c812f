//! Applying edit operations to a concrete representation.
//!
//! Every representation the engine patches (in-memory trees, the live
//! visual tree, source-text shadow trees, script ASTs) implements
//! [`PatchTarget`]; the operation dispatch lives here once.

use crate::error::DiffError;
use crate::operations::{AttributeDelta, EditOperation, NodePath};
use dragndrop_parser::Node;

pub trait PatchTarget {
    type Error;

    fn insert(&mut self, parent: &NodePath, index: usize, node: &Node) -> Result<(), Self::Error>;

    fn remove(&mut self, path: &NodePath) -> Result<(), Self::Error>;

    fn replace(&mut self, path: &NodePath, node: &Node) -> Result<(), Self::Error>;

    fn update_attributes(
        &mut self,
        path: &NodePath,
        attributes: &AttributeDelta,
        style: &AttributeDelta,
    ) -> Result<(), Self::Error>;

    fn update_text(&mut self, path: &NodePath, content: &str) -> Result<(), Self::Error>;

    fn move_node(
        &mut self,
        from: &NodePath,
        to_parent: &NodePath,
        to_index: usize,
    ) -> Result<(), Self::Error>;

    fn apply_operation(&mut self, op: &EditOperation) -> Result<(), Self::Error> {
        match op {
            EditOperation::Insert {
                parent,
                index,
                node,
            } => self.insert(parent, *index, node),
            EditOperation::Remove { path } => self.remove(path),
            EditOperation::Replace { path, node } => self.replace(path, node),
            EditOperation::UpdateAttributes {
                path,
                attributes,
                style,
            } => self.update_attributes(path, attributes, style),
            EditOperation::UpdateText { path, content } => self.update_text(path, content),
            EditOperation::Move {
                from,
                to_parent,
                to_index,
            } => self.move_node(from, to_parent, *to_index),
        }
    }

    /// Apply `ops` in order, stopping at the first failure
    fn apply_operations(&mut self, ops: &[EditOperation]) -> Result<(), Self::Error> {
        ops.iter().try_for_each(|op| self.apply_operation(op))
    }
}

/// Apply `ops` to an in-memory Document Tree
pub fn apply(tree: &mut Node, ops: &[EditOperation]) -> Result<(), DiffError> {
    tree.apply_operations(ops)
}

fn children_mut<'a>(tree: &'a mut Node, path: &NodePath) -> Result<&'a mut Vec<Node>, DiffError> {
    match tree.get_mut(path.indices()) {
        Some(Node::Element(el)) => Ok(&mut el.children),
        Some(Node::Text(_)) => Err(DiffError::unresolved(path, "text nodes have no children")),
        None => Err(DiffError::unresolved(path, "no such node")),
    }
}

fn node_mut<'a>(tree: &'a mut Node, path: &NodePath) -> Result<&'a mut Node, DiffError> {
    tree.get_mut(path.indices())
        .ok_or_else(|| DiffError::unresolved(path, "no such node"))
}

/// Detach the node at `path` from its parent
fn take(tree: &mut Node, path: &NodePath) -> Result<Node, DiffError> {
    let (parent, index) = path
        .split_last()
        .ok_or_else(|| DiffError::unresolved(path, "the root cannot be detached"))?;
    let children = children_mut(tree, &parent)?;
    if index >= children.len() {
        return Err(DiffError::unresolved(path, "index out of range"));
    }
    Ok(children.remove(index))
}

impl PatchTarget for Node {
    type Error = DiffError;

    fn insert(&mut self, parent: &NodePath, index: usize, node: &Node) -> Result<(), DiffError> {
        let children = children_mut(self, parent)?;
        if index > children.len() {
            return Err(DiffError::unresolved(
                &parent.child(index),
                "insert index out of range",
            ));
        }
        children.insert(index, node.clone());
        Ok(())
    }

    fn remove(&mut self, path: &NodePath) -> Result<(), DiffError> {
        take(self, path).map(drop)
    }

    fn replace(&mut self, path: &NodePath, node: &Node) -> Result<(), DiffError> {
        *node_mut(self, path)? = node.clone();
        Ok(())
    }

    fn update_attributes(
        &mut self,
        path: &NodePath,
        attributes: &AttributeDelta,
        style: &AttributeDelta,
    ) -> Result<(), DiffError> {
        let element = node_mut(self, path)?
            .as_element_mut()
            .ok_or_else(|| DiffError::unresolved(path, "attributes on a text node"))?;
        attributes.apply_to(&mut element.attributes);
        style.apply_to(&mut element.style);
        Ok(())
    }

    fn update_text(&mut self, path: &NodePath, content: &str) -> Result<(), DiffError> {
        match node_mut(self, path)? {
            Node::Text(text) => {
                text.content = content.to_string();
                Ok(())
            }
            Node::Element(_) => Err(DiffError::unresolved(path, "text update on an element")),
        }
    }

    fn move_node(
        &mut self,
        from: &NodePath,
        to_parent: &NodePath,
        to_index: usize,
    ) -> Result<(), DiffError> {
        let node = take(self, from)?;
        self.insert(to_parent, to_index, &node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::element("ul")
            .with_child(Node::element("li").with_child(Node::text("a")))
            .with_child(Node::element("li").with_child(Node::text("b")))
    }

    #[test]
    fn test_insert_and_remove() {
        let mut tree = sample();
        apply(
            &mut tree,
            &[
                EditOperation::Remove {
                    path: NodePath::new(vec![0]),
                },
                EditOperation::Insert {
                    parent: NodePath::root(),
                    index: 1,
                    node: Node::element("li"),
                },
            ],
        )
        .unwrap();
        assert_eq!(tree.children().len(), 2);
        assert_eq!(tree.get(&[0, 0]).and_then(Node::as_text), Some("b"));
        assert!(tree.children()[1].children().is_empty());
    }

    #[test]
    fn test_move_uses_post_detach_index() {
        let mut tree = sample();
        let op = EditOperation::Move {
            from: NodePath::new(vec![0]),
            to_parent: NodePath::root(),
            to_index: 1,
        };
        apply(&mut tree, &[op]).unwrap();
        assert_eq!(tree.get(&[0, 0]).and_then(Node::as_text), Some("b"));
        assert_eq!(tree.get(&[1, 0]).and_then(Node::as_text), Some("a"));
    }

    #[test]
    fn test_unresolved_paths_are_errors() {
        let mut tree = sample();
        let err = apply(
            &mut tree,
            &[EditOperation::Remove {
                path: NodePath::new(vec![5]),
            }],
        )
        .unwrap_err();
        assert!(matches!(err, DiffError::UnresolvedPath { .. }));

        let err = apply(
            &mut tree,
            &[EditOperation::UpdateText {
                path: NodePath::new(vec![0]),
                content: "x".into(),
            }],
        )
        .unwrap_err();
        assert!(err.to_string().contains("/0"));
    }

    #[test]
    fn test_root_replace() {
        let mut tree = sample();
        let op = EditOperation::Replace {
            path: NodePath::root(),
            node: Node::element("ol"),
        };
        apply(&mut tree, &[op]).unwrap();
        assert_eq!(tree, Node::element("ol"));
    }
}
