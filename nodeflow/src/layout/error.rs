use thiserror::Error;

/// The graph is not a forest; positions are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// `node_id` is on a cycle (unreachable from any root).
    #[error("layout: node '{node_id}' is part of a cycle")]
    Cycle { node_id: String },

    #[error("layout: node '{node_id}' has two parents ('{first}' and '{second}')")]
    MultipleParents {
        node_id: String,
        first: String,
        second: String,
    },
}
