//! # Pagecraft Document
//!
//! Scene graph model for Pagecraft pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ document: scene graph + store               │
//! │  - Node / NodeTree / SceneGraph             │
//! │  - Structural invariants                    │
//! │  - Snapshot serialization                   │
//! │  - Selection + undo/redo history            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: editing session over a store        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagecraft_document::{InMemoryStore, NodeData, SceneGraphStore};
//!
//! let mut store = InMemoryStore::default();
//! let text = store.parse_fresh_node(NodeData::new("Text").with_prop("body", "Save the date"));
//! store.add(text, &"default-section".into(), None)?;
//!
//! let snapshot = store.serialize()?;
//! store.undo()?;
//! ```

mod defaults;
mod error;
mod graph;
mod history;
mod id_generator;
mod node;
mod store;

pub use defaults::{default_document, DEFAULT_SECTION_ID, SECTION_TYPE};
pub use error::DocumentError;
pub use graph::SceneGraph;
pub use history::History;
pub use id_generator::{document_seed, IdGenerator};
pub use node::{Node, NodeData, NodeId, NodeTree, CUSTOM_ID_KEY, ROOT_NODE_ID};
pub use store::{InMemoryStore, SceneGraphStore};
