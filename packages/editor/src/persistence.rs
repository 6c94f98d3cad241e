//! Remote persistence contract

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Platform;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistenceError {
    #[error("Save rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Save was cancelled")]
    Cancelled,
}

/// Stores a platform snapshot remotely. Hosts with an asynchronous backend
/// use the two-phase session API instead of implementing this directly.
pub trait Persistence {
    fn save(&self, platform: Platform, payload: &str) -> Result<(), PersistenceError>;
}

/// A save handed to the host, to be completed with its outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub platform: Platform,
    pub payload: String,
    pub requested_at: DateTime<Utc>,
}
