//! # Clipboard and Duplication
//!
//! Copy, cut and paste of node subtrees.
//!
//! ## Cloning
//!
//! A captured subtree cannot be inserted as-is: its ids already exist in
//! the live graph. Cloning remaps every id in two passes:
//!
//! 1. Walk the captured tree from its root through `children` and
//!    `linked_nodes`, assigning a fresh id to every id encountered.
//! 2. Rebuild every node with its new id and every reference (children,
//!    linked nodes, parent) translated through the table.
//!
//! Nothing is rewritten until the table is complete, so a clone never holds
//! a mix of old and new ids. Only the cloned root is shifted by the paste
//! offset; descendants keep their positions relative to it.

use std::collections::BTreeMap;

use serde_json::{Number, Value};

use pagecraft_document::{Node, NodeId, NodeTree, SceneGraph};

use crate::{Overlay, SessionConfig, SessionError, ValidationError};

/// Position props shifted on paste
pub const POSITION_PROPS: [&str; 2] = ["top", "left"];

/// Holds at most one captured subtree
#[derive(Debug, Default)]
pub struct Clipboard {
    captured: Option<NodeTree>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.captured.is_none()
    }

    pub fn contents(&self) -> Option<&NodeTree> {
        self.captured.as_ref()
    }

    pub fn put(&mut self, tree: NodeTree) {
        self.captured = Some(tree);
    }

    pub fn clear(&mut self) {
        self.captured = None;
    }
}

/// Snapshot the full subtree at `id`, refusing the page root and singleton
/// overlay roots
pub fn capture_subtree(
    graph: &SceneGraph,
    id: &NodeId,
    config: &SessionConfig,
) -> Result<NodeTree, SessionError> {
    let node = graph
        .get(id)
        .ok_or_else(|| pagecraft_document::DocumentError::NodeNotFound(id.clone()))?;

    if id == &graph.root().id {
        return Err(ValidationError::RootSelected.into());
    }
    if config.is_non_duplicable(node.display_type()) {
        return Err(ValidationError::NonDuplicable {
            node_id: id.clone(),
            type_name: node.display_type().to_string(),
        }
        .into());
    }

    Ok(graph.to_node_tree(id)?)
}

/// Pass 1: old id → new id for every id reachable from the tree root
pub fn build_remap_table(
    tree: &NodeTree,
    mut next_id: impl FnMut() -> NodeId,
) -> BTreeMap<NodeId, NodeId> {
    let mut table = BTreeMap::new();
    let mut stack = vec![tree.root_node_id.clone()];

    while let Some(old) = stack.pop() {
        if table.contains_key(&old) {
            continue;
        }
        if let Some(node) = tree.nodes.get(&old) {
            stack.extend(node.owned_ids().cloned());
        }
        table.insert(old, next_id());
    }

    table
}

/// Clone `tree` with fresh ids, shifting only the new root by `offset`
pub fn remap_tree(tree: &NodeTree, next_id: impl FnMut() -> NodeId, offset: f64) -> NodeTree {
    let table = build_remap_table(tree, next_id);
    let translate = |id: &NodeId| table.get(id).cloned().unwrap_or_else(|| id.clone());

    // Pass 2
    let mut nodes = BTreeMap::new();
    for (old, new) in &table {
        let Some(source) = tree.nodes.get(old) else {
            continue;
        };

        let mut node = source.clone();
        node.id = new.clone();
        node.children = source.children.iter().map(translate).collect();
        node.linked_nodes = source
            .linked_nodes
            .iter()
            .map(|(name, id)| (name.clone(), translate(id)))
            .collect();
        node.parent = if old == &tree.root_node_id {
            None
        } else {
            source.parent.as_ref().and_then(|p| table.get(p).cloned())
        };
        nodes.insert(new.clone(), node);
    }

    let root_node_id = translate(&tree.root_node_id);
    if let Some(root) = nodes.get_mut(&root_node_id) {
        apply_position_offset(root, offset);
    }

    NodeTree {
        root_node_id,
        nodes,
    }
}

/// Degraded clone: the captured root alone, with a fresh id and no owned nodes
pub fn clone_root_only(tree: &NodeTree, new_id: NodeId, offset: f64) -> Option<Node> {
    let mut node = tree.root()?.clone();
    node.id = new_id;
    node.children.clear();
    node.linked_nodes.clear();
    node.parent = None;
    apply_position_offset(&mut node, offset);
    Some(node)
}

pub fn apply_position_offset(node: &mut Node, offset: f64) {
    for key in POSITION_PROPS {
        if let Some(value) = node.data.props.get_mut(key) {
            if let Some(shifted) = shift_position(value, offset) {
                *value = shifted;
            }
        }
    }
}

/// Add `offset` to a numeric position, or to a string like `"120px"`
fn shift_position(value: &Value, offset: f64) -> Option<Value> {
    match value {
        Value::Number(n) => {
            if let (Some(i), true) = (n.as_i64(), offset.fract() == 0.0) {
                if let Some(shifted) = i.checked_add(offset as i64) {
                    return Some(Value::from(shifted));
                }
            }
            Number::from_f64(n.as_f64()? + offset).map(Value::Number)
        }
        Value::String(s) => {
            let split = s
                .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
                .unwrap_or(s.len());
            let (number, unit) = s.split_at(split);
            let shifted = number.parse::<f64>().ok()? + offset;
            Some(Value::String(format!("{}{}", shifted, unit)))
        }
        _ => None,
    }
}

/// Where a paste lands
#[derive(Debug, Clone, PartialEq)]
pub struct PasteTarget {
    pub parent: NodeId,

    /// `None` appends at the end
    pub index: Option<usize>,
}

/// Resolve the paste container for the current selection.
///
/// An open popup or dropbox editor captures the paste (appended at the
/// end). Otherwise the paste goes into the selected section itself, or the
/// nearest section enclosing the selection, or the first top-level section,
/// or the root. Inside an enclosing container it lands right after the
/// selected branch; a selected section gets the paste appended.
pub fn resolve_paste_target(
    graph: &SceneGraph,
    overlay: Option<&Overlay>,
    selection: &NodeId,
    config: &SessionConfig,
) -> PasteTarget {
    if let Some(root) = overlay.and_then(Overlay::modal_root) {
        if graph.contains(root) {
            return PasteTarget {
                parent: root.clone(),
                index: None,
            };
        }
        tracing::warn!(overlay_root = %root, "open overlay root is not in the graph");
    }

    let is_section = |id: &NodeId| {
        graph
            .get(id)
            .is_some_and(|n| config.is_section(n.display_type()))
    };

    let ancestors = graph.ancestors(selection);
    let parent = std::iter::once(selection)
        .chain(ancestors.iter())
        .find(|id| is_section(id))
        .or_else(|| graph.root().children.iter().find(|id| is_section(id)))
        .cloned()
        .unwrap_or_else(NodeId::root);

    let index = graph.get(&parent).and_then(|p| {
        p.children
            .iter()
            .position(|child| child == selection || ancestors.contains(child))
            .map(|i| i + 1)
    });

    PasteTarget { parent, index }
}
