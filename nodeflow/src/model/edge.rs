//! Parent → child edges.

use serde::{Deserialize, Serialize};

/// Directed parent → child edge. `source` is the parent, `target` the child.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub selected: bool,
}

impl Edge {
    /// Edge with the canonical id `${source}-${target}`.
    pub fn between(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: edge_id(&source, &target),
            source,
            target,
            selected: false,
        }
    }
}

/// Canonical edge id for a parent/child pair.
///
/// Not unique on its own when ids contain `-`: `a -> b-c` and `a-b -> c` both map to
/// `a-b-c`. `GraphStore::connect` appends a numeric suffix when the id is already taken.
pub fn edge_id(source: &str, target: &str) -> String {
    format!("{}-{}", source, target)
}

/// Manual connection request from the rendering surface (drag from handle to handle).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    pub source: String,
    pub target: String,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}
