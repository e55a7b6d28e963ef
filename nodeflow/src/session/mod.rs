//! Expansion sessions: one streamed request/response cycle per parent node.

mod error;
mod manager;
mod state;

pub use error::SessionError;
pub use manager::{CommitSummary, ExpansionManager, FinalizedBatch, SessionReport};
pub use state::{SessionConfig, SessionId, SessionState};
