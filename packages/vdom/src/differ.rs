//! # Tree Differ
//!
//! Produces the operations that turn one Document Tree into another.
//!
//! Children are matched by `id` key where the key is unique on both sides;
//! the remaining children pair up positionally (k-th unkeyed with k-th
//! unkeyed). Matched children that keep their relative order (the longest
//! increasing subsequence of their new indices) stay put; the others move.
//!
//! Emission order per parent:
//!
//! ```text
//!   1. operations inside matched children   (pre-edit indices)
//!   2. Remove, descending index
//!   3. Insert / Move, last new child first  (indices of the list as it is then)
//! ```
//!
//! Since a parent's own structural edits come after everything emitted for
//! its subtree, every ancestor index in a path is still a pre-edit index when
//! the operation runs.

use crate::operations::{AttributeDelta, EditOperation, NodePath};
use dragndrop_parser::Node;
use std::collections::HashMap;
use tracing::trace;

/// Diff two Document Trees
pub fn diff(old: &Node, new: &Node) -> Vec<EditOperation> {
    let mut ops = Vec::new();
    diff_node(old, new, &NodePath::root(), &mut ops);
    trace!(
        operations = ops.len(),
        structural = ops.iter().filter(|op| op.is_structural()).count(),
        "Diffed document trees"
    );
    ops
}

/// Whether `diff` keeps `old` in place (possibly updating it) rather than replacing it
fn same_kind(old: &Node, new: &Node) -> bool {
    match (old, new) {
        (Node::Element(a), Node::Element(b)) => a.tag == b.tag,
        (Node::Text(_), Node::Text(_)) => true,
        _ => false,
    }
}

fn diff_node(old: &Node, new: &Node, path: &NodePath, ops: &mut Vec<EditOperation>) {
    match (old, new) {
        (Node::Text(a), Node::Text(b)) => {
            if a.content != b.content {
                ops.push(EditOperation::UpdateText {
                    path: path.clone(),
                    content: b.content.clone(),
                });
            }
        }
        (Node::Element(a), Node::Element(b)) if a.tag == b.tag => {
            let attributes = AttributeDelta::between(&a.attributes, &b.attributes);
            let style = AttributeDelta::between(&a.style, &b.style);
            if !attributes.is_empty() || !style.is_empty() {
                ops.push(EditOperation::UpdateAttributes {
                    path: path.clone(),
                    attributes,
                    style,
                });
            }
            diff_children(&a.children, &b.children, path, ops);
        }
        _ => ops.push(EditOperation::Replace {
            path: path.clone(),
            node: new.clone(),
        }),
    }
}

/// Keys occurring exactly once in a sibling list
fn unique_keys(children: &[Node]) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (index, child) in children.iter().enumerate() {
        if let Some(key) = child.key() {
            let entry = counts.entry(key).or_insert((0, index));
            entry.0 += 1;
        }
    }
    counts
        .into_iter()
        .filter(|(_, (count, _))| *count == 1)
        .map(|(key, (_, index))| (key, index))
        .collect()
}

/// For each new child, the old child it is matched with
fn match_children(old: &[Node], new: &[Node]) -> Vec<Option<usize>> {
    let old_keys = unique_keys(old);
    let new_keys = unique_keys(new);
    let keyed_in = |keys: &HashMap<&str, usize>, node: &Node, index: usize| {
        node.key()
            .and_then(|key| keys.get(key))
            .is_some_and(|&at| at == index)
    };

    let mut matches = vec![None; new.len()];
    for (j, child) in new.iter().enumerate() {
        if !keyed_in(&new_keys, child, j) {
            continue;
        }
        if let Some(&i) = child.key().and_then(|key| old_keys.get(key)) {
            matches[j] = Some(i);
        }
    }

    let old_unkeyed = old
        .iter()
        .enumerate()
        .filter(|(i, child)| !keyed_in(&old_keys, child, *i))
        .map(|(i, _)| i);
    let new_unkeyed = new
        .iter()
        .enumerate()
        .filter(|(j, child)| !keyed_in(&new_keys, child, *j))
        .map(|(j, _)| j);
    for (i, j) in old_unkeyed.zip(new_unkeyed) {
        matches[j] = Some(i);
    }

    matches
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Old(usize),
    New(usize),
}

fn diff_children(old: &[Node], new: &[Node], parent: &NodePath, ops: &mut Vec<EditOperation>) {
    let matches = match_children(old, new);

    let mut old_to_new = vec![None; old.len()];
    for (j, matched) in matches.iter().enumerate() {
        if let Some(i) = *matched {
            old_to_new[i] = Some(j);
        }
    }

    // 1. matched pairs: recurse, or replace in place when the kind changed
    for (j, matched) in matches.iter().enumerate() {
        let Some(i) = *matched else { continue };
        let path = parent.child(i);
        if same_kind(&old[i], &new[j]) {
            diff_node(&old[i], &new[j], &path, ops);
        } else {
            ops.push(EditOperation::Replace {
                path,
                node: new[j].clone(),
            });
        }
    }

    // 2. removals, highest index first
    for i in (0..old.len()).rev() {
        if old_to_new[i].is_none() {
            ops.push(EditOperation::Remove {
                path: parent.child(i),
            });
        }
    }

    // 3. inserts and moves against a simulation of the current child list
    let mut current: Vec<Slot> = (0..old.len())
        .filter(|&i| old_to_new[i].is_some())
        .map(Slot::Old)
        .collect();

    let sequence: Vec<usize> = current
        .iter()
        .filter_map(|slot| match slot {
            Slot::Old(i) => old_to_new[*i],
            Slot::New(_) => None,
        })
        .collect();
    let stays: Vec<bool> = {
        let mut stays = vec![false; new.len()];
        for position in longest_increasing_subsequence(&sequence) {
            stays[sequence[position]] = true;
        }
        stays
    };

    let slot_of = |j: usize| match matches[j] {
        Some(i) => Slot::Old(i),
        None => Slot::New(j),
    };

    for j in (0..new.len()).rev() {
        let anchor = (j + 1 < new.len()).then(|| slot_of(j + 1));
        match matches[j] {
            None => {
                let index = position_before(&current, anchor);
                current.insert(index, Slot::New(j));
                ops.push(EditOperation::Insert {
                    parent: parent.clone(),
                    index,
                    node: new[j].clone(),
                });
            }
            Some(_) if stays[j] => {}
            Some(i) => {
                let Some(from) = current.iter().position(|slot| *slot == Slot::Old(i)) else {
                    continue;
                };
                current.remove(from);
                let to_index = position_before(&current, anchor);
                current.insert(to_index, Slot::Old(i));
                ops.push(EditOperation::Move {
                    from: parent.child(from),
                    to_parent: parent.clone(),
                    to_index,
                });
            }
        }
    }
}

/// Index an element placed right before `anchor` would get
fn position_before(current: &[Slot], anchor: Option<Slot>) -> usize {
    anchor
        .and_then(|anchor| current.iter().position(|slot| *slot == anchor))
        .unwrap_or(current.len())
}

/// Positions (into `sequence`) of one longest strictly increasing subsequence
pub(crate) fn longest_increasing_subsequence(sequence: &[usize]) -> Vec<usize> {
    // tails[k]: position of the smallest tail of an increasing run of length k + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; sequence.len()];

    for (position, &value) in sequence.iter().enumerate() {
        let k = tails.partition_point(|&tail| sequence[tail] < value);
        if k > 0 {
            previous[position] = Some(tails[k - 1]);
        }
        if k == tails.len() {
            tails.push(position);
        } else {
            tails[k] = position;
        }
    }

    let mut result = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(position) = cursor {
        result.push(position);
        cursor = previous[position];
    }
    result.reverse();
    result
}
