//! Error types for the editing session

use pagecraft_document::{DocumentError, NodeId};
use thiserror::Error;

use crate::persistence::PersistenceError;
use crate::sync::SyncError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("State conflict: {0}")]
    StateConflict(&'static str),

    /// Produced by [`SyncOutcome::into_result`](crate::SyncOutcome::into_result)
    #[error("Sync failure: {0}")]
    SyncFailure(#[from] SyncError),

    /// Produced by [`RemoteSaveOutcome::into_result`](crate::RemoteSaveOutcome::into_result)
    #[error("Persistence failure: {0}")]
    PersistenceFailure(#[from] PersistenceError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// User actions that cannot run in the current state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Clipboard is empty")]
    EmptyClipboard,

    #[error("Nothing is selected")]
    NoSelection,

    #[error("The page root cannot be copied or cut")]
    RootSelected,

    #[error("{type_name} nodes cannot be duplicated ({node_id})")]
    NonDuplicable { node_id: NodeId, type_name: String },

    #[error("Session is view-only")]
    ViewOnly,
}
