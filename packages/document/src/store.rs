//! # Scene Graph Store
//!
//! The contract the editing session consumes, plus an in-memory store.
//!
//! A store owns the live graph, the current selection and the undo
//! history. Every structural mutation is all-or-nothing: on error the
//! graph is left exactly as it was and no history entry is recorded.

use serde_json::Value;

use crate::{
    DocumentError, History, IdGenerator, Node, NodeData, NodeId, NodeTree, SceneGraph,
};

pub trait SceneGraphStore {
    /// Read-only view of the live graph
    fn graph(&self) -> &SceneGraph;

    fn serialize(&self) -> Result<String, DocumentError>;

    /// Replace the live graph wholesale. Clears selection and history.
    fn deserialize(&mut self, snapshot: &str) -> Result<(), DocumentError>;

    fn get(&self, id: &NodeId) -> Option<&Node> {
        self.graph().get(id)
    }

    fn contains(&self, id: &NodeId) -> bool {
        self.graph().contains(id)
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.graph().nodes().map(|n| n.id.clone()).collect()
    }

    fn add(&mut self, node: Node, parent: &NodeId, index: Option<usize>) -> Result<(), DocumentError>;

    /// Insert a whole subtree atomically, when the store supports it
    fn add_tree(
        &mut self,
        _tree: NodeTree,
        _parent: &NodeId,
        _index: Option<usize>,
    ) -> Result<(), DocumentError> {
        Err(DocumentError::Unsupported("add_tree"))
    }

    fn delete(&mut self, id: &NodeId) -> Result<(), DocumentError>;

    fn set_prop(&mut self, id: &NodeId, key: &str, value: Value) -> Result<(), DocumentError>;

    fn set_hidden(&mut self, id: &NodeId, hidden: bool) -> Result<(), DocumentError>;

    fn select_node(&mut self, id: Option<NodeId>);

    fn selected(&self) -> Option<&NodeId>;

    fn to_node_tree(&self, root: &NodeId) -> Result<NodeTree, DocumentError> {
        self.graph().to_node_tree(root)
    }

    /// An id no node in the live graph uses
    fn fresh_id(&mut self) -> NodeId;

    /// Build a brand new node with a fresh id
    fn parse_fresh_node(&mut self, data: NodeData) -> Node {
        let id = self.fresh_id();
        Node::new(id, data)
    }

    /// Rebuild a node from its serialized form
    fn parse_serialized_node(&self, value: Value) -> Result<Node, DocumentError> {
        Ok(serde_json::from_value(value)?)
    }

    fn undo(&mut self) -> Result<bool, DocumentError>;

    fn redo(&mut self) -> Result<bool, DocumentError>;

    fn can_undo(&self) -> bool;

    fn can_redo(&self) -> bool;
}

/// Scene graph store backed by an in-process graph
#[derive(Debug)]
pub struct InMemoryStore {
    graph: SceneGraph,
    history: History,
    selected: Option<NodeId>,
    ids: IdGenerator,
}

impl InMemoryStore {
    pub fn new(graph: SceneGraph) -> Self {
        Self::with_history_depth(graph, 100)
    }

    pub fn with_history_depth(graph: SceneGraph, depth: usize) -> Self {
        Self {
            graph,
            history: History::with_max_levels(depth),
            selected: None,
            ids: IdGenerator::new("pagecraft"),
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Apply `change` to a working copy and commit it with one history entry
    fn mutate<T>(
        &mut self,
        change: impl FnOnce(&mut SceneGraph) -> Result<T, DocumentError>,
    ) -> Result<T, DocumentError> {
        let mut working = self.graph.clone();
        let result = change(&mut working)?;
        let before = std::mem::replace(&mut self.graph, working);
        self.history.record(before);
        Ok(result)
    }

    fn drop_stale_selection(&mut self) {
        if let Some(selected) = &self.selected {
            if !self.graph.contains(selected) {
                self.selected = None;
            }
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(crate::default_document())
    }
}

impl SceneGraphStore for InMemoryStore {
    fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    fn serialize(&self) -> Result<String, DocumentError> {
        self.graph.to_snapshot()
    }

    fn deserialize(&mut self, snapshot: &str) -> Result<(), DocumentError> {
        let graph = SceneGraph::from_snapshot(snapshot)?;
        tracing::debug!(nodes = graph.len(), "scene graph deserialized");
        self.graph = graph;
        self.history.clear();
        self.selected = None;
        Ok(())
    }

    fn add(&mut self, node: Node, parent: &NodeId, index: Option<usize>) -> Result<(), DocumentError> {
        self.mutate(|graph| graph.insert_node(node, parent, index))
    }

    fn add_tree(
        &mut self,
        tree: NodeTree,
        parent: &NodeId,
        index: Option<usize>,
    ) -> Result<(), DocumentError> {
        self.mutate(|graph| graph.insert_tree(tree, parent, index))
    }

    fn delete(&mut self, id: &NodeId) -> Result<(), DocumentError> {
        let removed = self.mutate(|graph| graph.remove_subtree(id))?;
        tracing::debug!(node = %id, removed = removed.len(), "subtree deleted");
        self.drop_stale_selection();
        Ok(())
    }

    fn set_prop(&mut self, id: &NodeId, key: &str, value: Value) -> Result<(), DocumentError> {
        self.mutate(|graph| {
            let node = graph
                .get_mut(id)
                .ok_or_else(|| DocumentError::NodeNotFound(id.clone()))?;
            node.data.props.insert(key.to_string(), value);
            Ok(())
        })
    }

    fn set_hidden(&mut self, id: &NodeId, hidden: bool) -> Result<(), DocumentError> {
        self.mutate(|graph| {
            let node = graph
                .get_mut(id)
                .ok_or_else(|| DocumentError::NodeNotFound(id.clone()))?;
            node.data.hidden = hidden;
            Ok(())
        })
    }

    fn select_node(&mut self, id: Option<NodeId>) {
        self.selected = id.filter(|id| self.graph.contains(id));
    }

    fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    fn fresh_id(&mut self) -> NodeId {
        let graph = &self.graph;
        self.ids.next_free(|id| graph.contains(id))
    }

    fn undo(&mut self) -> Result<bool, DocumentError> {
        let undone = self.history.undo(&mut self.graph);
        self.drop_stale_selection();
        Ok(undone)
    }

    fn redo(&mut self) -> Result<bool, DocumentError> {
        let redone = self.history.redo(&mut self.graph);
        self.drop_stale_selection();
        Ok(redone)
    }

    fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}
