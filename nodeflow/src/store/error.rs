//! Structural errors returned by the graph store.
//!
//! Every error leaves the graph unchanged: mutations are staged and only swapped in
//! once all invariants hold.

use thiserror::Error;

use crate::model::NodeKind;

/// Graph mutation rejected because it would break a structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// `add_child_node` / commit targeted a parent that is not in the graph.
    #[error("parent node not found: {parent_id}")]
    ParentNotFound { parent_id: String },

    /// The target already has a parent; edges must form a single-parent forest.
    #[error("node '{target}' already has parent '{existing_parent}', cannot connect from '{attempted_parent}'")]
    MultipleParents {
        target: String,
        existing_parent: String,
        attempted_parent: String,
    },

    /// An edge references a node that is not (or would no longer be) in the graph.
    #[error("{operation}: edge '{edge_id}' references missing node '{node_id}'")]
    DanglingEdge {
        edge_id: String,
        node_id: String,
        operation: &'static str,
    },

    #[error("{operation}: node not found: {id}")]
    NodeNotFound { id: String, operation: &'static str },

    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),

    #[error("duplicate edge id: {0}")]
    DuplicateEdgeId(String),

    /// Adding `parent -> child` would close a cycle.
    #[error("edge '{parent}' -> '{child}' would create a cycle")]
    Cycle { parent: String, child: String },

    /// The id generator kept producing ids that are already taken.
    #[error("no free child id under '{parent_id}' after {attempts} attempts")]
    IdsExhausted { parent_id: String, attempts: usize },

    /// A data edit tried to change the node's kind.
    #[error("node '{id}' is a {expected} node, got {actual} data")]
    TypeMismatch {
        id: String,
        expected: NodeKind,
        actual: NodeKind,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display of DanglingEdge names operation, edge and node.
    #[test]
    fn dangling_edge_display_has_context() {
        let err = GraphError::DanglingEdge {
            edge_id: "a-b".into(),
            node_id: "b".into(),
            operation: "apply_node_changes",
        };
        let s = err.to_string();
        assert!(s.contains("apply_node_changes"), "{}", s);
        assert!(s.contains("a-b"), "{}", s);
        assert!(s.contains("'b'"), "{}", s);
    }

    /// **Scenario**: MultipleParents names both parents.
    #[test]
    fn multiple_parents_display_names_both_parents() {
        let err = GraphError::MultipleParents {
            target: "c".into(),
            existing_parent: "a".into(),
            attempted_parent: "b".into(),
        };
        let s = err.to_string();
        assert!(s.contains("'a'") && s.contains("'b'") && s.contains("'c'"), "{}", s);
    }

    /// **Scenario**: Cycle names both endpoints and carries no underlying cause.
    #[test]
    fn cycle_display_names_edge() {
        use std::error::Error as _;
        let err = GraphError::Cycle {
            parent: "a-1".into(),
            child: "a".into(),
        };
        assert_eq!(err.to_string(), "edge 'a-1' -> 'a' would create a cycle");
        assert!(err.source().is_none());
    }
}
