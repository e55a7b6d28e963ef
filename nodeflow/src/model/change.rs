//! Change deltas sent by a rendering surface (drag, select, remove, add).
//!
//! Applied in batches by [`GraphStore::apply_node_changes`](crate::store::GraphStore::apply_node_changes)
//! and [`GraphStore::apply_edge_changes`](crate::store::GraphStore::apply_edge_changes).

use super::{Edge, Node, Position};

/// One node delta.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeChange {
    /// Drag update: new position and/or dragging flag.
    Position {
        id: String,
        position: Option<Position>,
        dragging: Option<bool>,
    },
    Select {
        id: String,
        selected: bool,
    },
    /// Remove the node; rejected while any edge still references it.
    Remove {
        id: String,
    },
    Add {
        node: Node,
    },
    /// Replace the node with the same id.
    Replace {
        node: Node,
    },
}

/// One edge delta.
#[derive(Clone, Debug, PartialEq)]
pub enum EdgeChange {
    Add { edge: Edge },
    Remove { id: String },
    Select { id: String, selected: bool },
}
