//! # Scene Graph
//!
//! The page being edited: a flat id → node map rooted at [`ROOT_NODE_ID`].
//!
//! ## Invariants
//!
//! - Every non-root node is reachable from the root exactly once, through
//!   either `children` or `linked_nodes`. This rules out cycles and shared
//!   subtrees.
//! - Every id referenced by `children` or `linked_nodes` exists.
//! - A node never lists the same id as both a child and a linked node.
//!
//! The serialized form is the node map itself, keyed by id, with stable key
//! order so that two equal graphs always serialize to the same string.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{DocumentError, Node, NodeId, NodeTree, ROOT_NODE_ID};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, Node>,
}

impl SceneGraph {
    /// Graph holding only the given root node (its id is forced to `ROOT`)
    pub fn with_root(mut root: Node) -> Self {
        root.id = NodeId::root();
        root.parent = None;
        root.children.clear();
        root.linked_nodes.clear();

        let mut nodes = BTreeMap::new();
        nodes.insert(NodeId::root(), root);
        Self { nodes }
    }

    /// Build a graph from raw nodes, validating every invariant
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Result<Self, DocumentError> {
        let nodes: BTreeMap<NodeId, Node> =
            nodes.into_iter().map(|n| (n.id.clone(), n)).collect();
        let mut graph = Self { nodes };
        graph.validate()?;
        graph.relink_parents();
        Ok(graph)
    }

    pub fn from_snapshot(snapshot: &str) -> Result<Self, DocumentError> {
        let nodes: BTreeMap<NodeId, Node> = serde_json::from_str(snapshot)?;
        for (key, node) in &nodes {
            if key != &node.id {
                return Err(DocumentError::InvalidTree(format!(
                    "node stored under {} carries id {}",
                    key, node.id
                )));
            }
        }
        Self::from_nodes(nodes.into_values())
    }

    pub fn to_snapshot(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(&self.nodes)?)
    }

    pub fn validate(&self) -> Result<(), DocumentError> {
        validate_structure(&NodeId::root(), &self.nodes)
    }

    pub fn root(&self) -> &Node {
        // `validate` guarantees the root exists for every constructed graph
        &self.nodes[&NodeId::root()]
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Owner of `id`, found by scanning `children` and `linked_nodes`
    pub fn parent_of(&self, id: &NodeId) -> Option<&NodeId> {
        self.nodes
            .values()
            .find(|n| n.owned_ids().any(|owned| owned == id))
            .map(|n| &n.id)
    }

    /// Owners of `id`, nearest first, ending at the root
    pub fn ancestors(&self, id: &NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = id.clone();
        while let Some(parent) = self.parent_of(&current) {
            chain.push(parent.clone());
            current = parent.clone();
        }
        chain
    }

    /// `id` and every node reachable from it, in depth-first order
    pub fn subtree_ids(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                let owned: Vec<NodeId> = node.owned_ids().cloned().collect();
                stack.extend(owned.into_iter().rev());
                out.push(current);
            }
        }
        out
    }

    /// Detached copy of the subtree rooted at `id`, linked nodes included
    pub fn to_node_tree(&self, id: &NodeId) -> Result<NodeTree, DocumentError> {
        if !self.contains(id) {
            return Err(DocumentError::NodeNotFound(id.clone()));
        }

        let nodes = self
            .subtree_ids(id)
            .into_iter()
            .filter_map(|node_id| self.nodes.get(&node_id).map(|n| (node_id, n.clone())))
            .collect();

        Ok(NodeTree {
            root_node_id: id.clone(),
            nodes,
        })
    }

    /// Insert a single childless node under `parent`
    pub fn insert_node(
        &mut self,
        mut node: Node,
        parent: &NodeId,
        index: Option<usize>,
    ) -> Result<(), DocumentError> {
        if self.contains(&node.id) {
            return Err(DocumentError::DuplicateId(node.id));
        }
        if let Some(missing) = node.owned_ids().find(|id| !self.contains(id)) {
            return Err(DocumentError::NodeNotFound(missing.clone()));
        }
        if !node.children.is_empty() || !node.linked_nodes.is_empty() {
            return Err(DocumentError::InvalidTree(
                "use insert_tree for nodes that own other nodes".to_string(),
            ));
        }

        let parent_node = self
            .nodes
            .get_mut(parent)
            .ok_or_else(|| DocumentError::ParentNotFound(parent.clone()))?;
        insert_child(&mut parent_node.children, node.id.clone(), index);

        node.parent = Some(parent.clone());
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Insert a whole subtree under `parent` in one step
    pub fn insert_tree(
        &mut self,
        tree: NodeTree,
        parent: &NodeId,
        index: Option<usize>,
    ) -> Result<(), DocumentError> {
        tree.validate()?;
        if !self.contains(parent) {
            return Err(DocumentError::ParentNotFound(parent.clone()));
        }
        if let Some(taken) = tree.nodes.keys().find(|id| self.contains(id)) {
            return Err(DocumentError::DuplicateId(taken.clone()));
        }

        let root_id = tree.root_node_id.clone();
        self.nodes.extend(tree.nodes);
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            insert_child(&mut parent_node.children, root_id, index);
        }
        self.relink_parents();
        Ok(())
    }

    /// Remove `id` together with its descendants and linked nodes
    pub fn remove_subtree(&mut self, id: &NodeId) -> Result<Vec<NodeId>, DocumentError> {
        if id.is_root() {
            return Err(DocumentError::CannotDeleteRoot);
        }
        if !self.contains(id) {
            return Err(DocumentError::NodeNotFound(id.clone()));
        }

        if let Some(owner) = self.parent_of(id).cloned() {
            if let Some(owner) = self.nodes.get_mut(&owner) {
                owner.children.retain(|c| c != id);
                owner.linked_nodes.retain(|_, linked| linked != id);
            }
        }

        let removed = self.subtree_ids(id);
        for node_id in &removed {
            self.nodes.remove(node_id);
        }
        Ok(removed)
    }

    /// Recompute every `parent` back-reference from ownership
    pub fn relink_parents(&mut self) {
        let owners: Vec<(NodeId, NodeId)> = self
            .nodes
            .values()
            .flat_map(|n| n.owned_ids().map(move |owned| (owned.clone(), n.id.clone())))
            .collect();

        for node in self.nodes.values_mut() {
            node.parent = None;
        }
        for (owned, owner) in owners {
            if let Some(node) = self.nodes.get_mut(&owned) {
                node.parent = Some(owner);
            }
        }
    }
}

fn insert_child(children: &mut Vec<NodeId>, id: NodeId, index: Option<usize>) {
    match index {
        Some(index) => children.insert(index.min(children.len()), id),
        None => children.push(id),
    }
}

/// Shared structural check for graphs and detached trees
pub(crate) fn validate_structure(
    root: &NodeId,
    nodes: &BTreeMap<NodeId, Node>,
) -> Result<(), DocumentError> {
    if !nodes.contains_key(root) {
        return Err(DocumentError::InvalidTree(format!("missing root {}", root)));
    }

    for node in nodes.values() {
        for owned in node.owned_ids() {
            if !nodes.contains_key(owned) {
                return Err(DocumentError::InvalidTree(format!(
                    "{} references missing node {}",
                    node.id, owned
                )));
            }
        }
        if let Some(both) = node
            .linked_nodes
            .values()
            .find(|linked| node.children.contains(linked))
        {
            return Err(DocumentError::InvalidTree(format!(
                "{} lists {} as both child and linked node",
                node.id, both
            )));
        }
    }

    let mut seen = BTreeSet::new();
    let mut stack = vec![root.clone()];
    while let Some(current) = stack.pop() {
        if !seen.insert(current.clone()) {
            return Err(DocumentError::InvalidTree(format!(
                "{} is reachable more than once",
                current
            )));
        }
        if let Some(node) = nodes.get(&current) {
            stack.extend(node.owned_ids().cloned());
        }
    }

    if seen.len() != nodes.len() {
        let orphan = nodes.keys().find(|id| !seen.contains(*id));
        return Err(DocumentError::InvalidTree(format!(
            "unreachable node {}",
            orphan.map(NodeId::as_str).unwrap_or(ROOT_NODE_ID)
        )));
    }

    Ok(())
}
