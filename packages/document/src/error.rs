//! Error types for the scene graph

use thiserror::Error;

use crate::NodeId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Parent not found: {0}")]
    ParentNotFound(NodeId),

    #[error("Node id already in use: {0}")]
    DuplicateId(NodeId),

    #[error("The root node cannot be deleted")]
    CannotDeleteRoot,

    #[error("Invalid tree: {0}")]
    InvalidTree(String),

    #[error("Operation not supported by this store: {0}")]
    Unsupported(&'static str),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DocumentError {
    fn from(e: serde_json::Error) -> Self {
        DocumentError::Serialization(e.to_string())
    }
}
