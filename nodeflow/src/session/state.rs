//! Session lifecycle states and configuration.

use std::fmt;
use std::time::Duration;

/// Lifecycle of one expansion, per parent node.
///
/// `Idle -> Submitting -> Streaming -> Finalizing -> Committed | Failed`. A cancelled
/// session goes straight back to `Idle`. Terminal states stay observable until the next
/// submit for the same parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Submitting,
    Streaming,
    /// Stream complete and validated; waiting for the owner to commit.
    Finalizing,
    Committed,
    Failed,
}

impl SessionState {
    /// True while the session blocks new submits for its parent.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SessionState::Submitting | SessionState::Streaming | SessionState::Finalizing
        )
    }
}

/// Opaque per-manager session identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Bounds for expansion sessions.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Capacity of the report channel between streaming tasks and the owner.
    pub channel_capacity: usize,
    /// Records accepted per stream; later records are ignored with a warning.
    pub max_records: usize,
    /// Whole-stream budget; exceeding it is a transport failure. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 32,
            max_records: 64,
            timeout: Some(Duration::from_secs(30)),
        }
    }
}
