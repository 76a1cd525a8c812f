use dragndrop_parser::Node;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Child-index path from the document root
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Parent path and index within it; `None` for the root
    pub fn split_last(&self) -> Option<(NodePath, usize)> {
        let (&last, parent) = self.0.split_last()?;
        Some((NodePath(parent.to_vec()), last))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

/// Set difference between two string maps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDelta {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub added: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub changed: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<String>,
}

impl AttributeDelta {
    pub fn between(old: &IndexMap<String, String>, new: &IndexMap<String, String>) -> Self {
        let mut delta = Self::default();
        for (name, value) in new {
            match old.get(name) {
                None => {
                    delta.added.insert(name.clone(), value.clone());
                }
                Some(previous) if previous != value => {
                    delta.changed.insert(name.clone(), value.clone());
                }
                Some(_) => {}
            }
        }
        delta.removed = old
            .keys()
            .filter(|name| !new.contains_key(*name))
            .cloned()
            .collect();
        delta
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }

    /// Names set by this delta, added first
    pub fn assignments(&self) -> impl Iterator<Item = (&String, &String)> {
        self.added.iter().chain(self.changed.iter())
    }

    pub fn apply_to(&self, map: &mut IndexMap<String, String>) {
        for name in &self.removed {
            map.shift_remove(name);
        }
        for (name, value) in self.assignments() {
            map.insert(name.clone(), value.clone());
        }
    }
}

/// One structural edit. Paths resolve against the tree as it is when the
/// operation is applied; see [`crate::diff`] for the ordering contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum EditOperation {
    Insert {
        parent: NodePath,
        index: usize,
        node: Node,
    },
    Remove {
        path: NodePath,
    },
    Replace {
        path: NodePath,
        node: Node,
    },
    UpdateAttributes {
        path: NodePath,
        attributes: AttributeDelta,
        style: AttributeDelta,
    },
    UpdateText {
        path: NodePath,
        content: String,
    },
    /// Detach the node at `from`, then insert it at `to_index` of the
    /// post-detach child list of `to_parent`
    Move {
        from: NodePath,
        to_parent: NodePath,
        to_index: usize,
    },
}

impl EditOperation {
    /// Path of the node the operation targets (the parent for `Insert`)
    pub fn path(&self) -> &NodePath {
        match self {
            EditOperation::Insert { parent, .. } => parent,
            EditOperation::Remove { path }
            | EditOperation::Replace { path, .. }
            | EditOperation::UpdateAttributes { path, .. }
            | EditOperation::UpdateText { path, .. } => path,
            EditOperation::Move { from, .. } => from,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditOperation::Insert { .. } => "insert",
            EditOperation::Remove { .. } => "remove",
            EditOperation::Replace { .. } => "replace",
            EditOperation::UpdateAttributes { .. } => "update_attributes",
            EditOperation::UpdateText { .. } => "update_text",
            EditOperation::Move { .. } => "move",
        }
    }

    /// Whether the operation changes a child list
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            EditOperation::Insert { .. } | EditOperation::Remove { .. } | EditOperation::Move { .. }
        )
    }
}
