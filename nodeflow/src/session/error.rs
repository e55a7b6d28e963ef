//! Session-level errors.

use thiserror::Error;

use crate::schema::ValidationRejected;
use crate::store::GraphError;

/// Why an expansion did not commit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// A session is already in flight for this parent.
    #[error("expansion already in progress for node {parent_id}")]
    Busy { parent_id: String },

    #[error("expanding node not found: {parent_id}")]
    ParentNotFound { parent_id: String },

    /// Generator refused, failed mid-stream, timed out or ended without completing.
    #[error("stream transport error for node {parent_id}: {message}")]
    StreamTransport { parent_id: String, message: String },

    /// The stream completed but every record failed validation.
    #[error("no valid records for node {parent_id} ({} rejected)", .rejected.len())]
    NoAcceptedRecords {
        parent_id: String,
        rejected: Vec<ValidationRejected>,
    },

    /// The batch insert was rejected by the graph store.
    #[error("commit rejected: {0}")]
    Graph(#[from] GraphError),

    #[error("expansion for node {parent_id} was cancelled")]
    Cancelled { parent_id: String },
}

impl SessionError {
    /// True for failures the user can simply retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SessionError::StreamTransport { .. } | SessionError::NoAcceptedRecords { .. }
        )
    }
}
