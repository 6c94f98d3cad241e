//! # Undo/Redo History
//!
//! Linear snapshot history for a scene graph.
//!
//! ## Design
//!
//! - Every mutation records the graph as it was before the change
//! - Undo swaps the current graph with the most recent recorded one
//! - Redo swaps it back
//! - New mutations clear the redo stack
//! - Loading a document wholesale clears the history

use crate::SceneGraph;

#[derive(Debug)]
pub struct History {
    /// Graphs before each applied mutation (most recent last)
    undo_stack: Vec<SceneGraph>,

    /// Graphs before each undo (most recent last)
    redo_stack: Vec<SceneGraph>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl History {
    /// Create a new history with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record the state a mutation is about to replace
    pub fn record(&mut self, before: SceneGraph) {
        self.undo_stack.push(before);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // New action invalidates future
        self.redo_stack.clear();
    }

    /// Step back one mutation, swapping `current` in place
    pub fn undo(&mut self, current: &mut SceneGraph) -> bool {
        match self.undo_stack.pop() {
            Some(previous) => {
                let undone = std::mem::replace(current, previous);
                self.redo_stack.push(undone);
                true
            }
            None => false,
        }
    }

    /// Reapply the most recently undone mutation
    pub fn redo(&mut self, current: &mut SceneGraph) -> bool {
        match self.redo_stack.pop() {
            Some(next) => {
                let replaced = std::mem::replace(current, next);
                self.undo_stack.push(replaced);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Node, NodeData};

    fn graph_with(label: &str) -> SceneGraph {
        SceneGraph::with_root(Node::new("ROOT", NodeData::new("Container").with_prop("label", label)))
    }

    #[test]
    fn test_history_creation() {
        let history = History::new();
        assert_eq!(history.undo_levels(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_then_redo_restores_states() {
        let mut history = History::new();
        let mut current = graph_with("v0");

        history.record(current.clone());
        current = graph_with("v1");

        assert!(history.undo(&mut current));
        assert_eq!(current, graph_with("v0"));
        assert!(history.can_redo());

        assert!(history.redo(&mut current));
        assert_eq!(current, graph_with("v1"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_new_record_clears_redo() {
        let mut history = History::new();
        let mut current = graph_with("v0");

        history.record(current.clone());
        current = graph_with("v1");
        history.undo(&mut current);
        assert_eq!(history.redo_levels(), 1);

        history.record(current.clone());
        assert_eq!(history.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut history = History::with_max_levels(2);
        for i in 0..3 {
            history.record(graph_with(&format!("v{}", i)));
        }
        assert_eq!(history.undo_levels(), 2);
    }
}
