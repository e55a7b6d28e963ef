//! Authoritative node/edge container.
//!
//! Every structural mutation is applied to a staged copy, checked against the forest
//! invariants (unique ids, no dangling edges, single parent, no cycles) and only then
//! swapped in. A rejected call leaves the graph exactly as it was.
//!
//! Edges are the source of truth for parentage: after each install, `Node::parent_id` is
//! re-derived from the edge whose target is that node.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::model::{edge_id, Connection, Edge, EdgeChange, Node, NodeChange, NodeData, Position};

use super::error::GraphError;
use super::ids::{child_id, IdGenerator, RandomIds};

/// Generator draws allowed per requested child id before giving up.
const MAX_ID_ATTEMPTS_PER_CHILD: usize = 64;

/// Nodes and edges of the workflow graph, in insertion order.
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: HashMap<String, usize>,
    revision: u64,
    ids: Arc<dyn IdGenerator>,
}

impl fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphStore")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("revision", &self.revision)
            .finish()
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    /// Empty graph with random child-id suffixes.
    pub fn new() -> Self {
        Self::with_id_generator(Arc::new(RandomIds))
    }

    pub fn with_id_generator(ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            index: HashMap::new(),
            revision: 0,
            ids,
        }
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of successful mutations so far. Layout position writes are not counted.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Source of the edge targeting `id`, if any.
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.edges
            .iter()
            .find(|e| e.target == id)
            .map(|e| e.source.as_str())
    }

    /// Children of `id`, in edge insertion order.
    pub fn children(&self, id: &str) -> Vec<&Node> {
        self.edges
            .iter()
            .filter(|e| e.source == id)
            .filter_map(|e| self.get_node(&e.target))
            .collect()
    }

    /// Reserves `count` fresh child ids under `parent_id` that collide with nothing in the graph.
    ///
    /// Fails with [`GraphError::IdsExhausted`] when the id generator keeps producing taken ids.
    pub fn child_ids(&self, parent_id: &str, count: usize) -> Result<Vec<String>, GraphError> {
        let max_attempts = count.saturating_mul(MAX_ID_ATTEMPTS_PER_CHILD);
        let mut out: Vec<String> = Vec::with_capacity(count);
        let mut attempts = 0;
        while out.len() < count {
            if attempts == max_attempts {
                return Err(GraphError::IdsExhausted {
                    parent_id: parent_id.to_string(),
                    attempts,
                });
            }
            attempts += 1;
            let id = child_id(parent_id, &self.ids.next_suffix());
            if !self.contains(&id) && !out.contains(&id) {
                out.push(id);
            }
        }
        Ok(out)
    }

    /// Replaces all nodes; rejected when the current edges would dangle.
    pub fn set_nodes(&mut self, nodes: Vec<Node>) -> Result<(), GraphError> {
        let edges = self.edges.clone();
        self.stage(nodes, edges, "set_nodes")
    }

    /// Replaces all edges; rejected when they dangle or break the forest shape.
    pub fn set_edges(&mut self, edges: Vec<Edge>) -> Result<(), GraphError> {
        let nodes = self.nodes.clone();
        self.stage(nodes, edges, "set_edges")
    }

    /// Applies a batch of node deltas atomically.
    ///
    /// Position/select/remove deltas for unknown ids are ignored. Removing a node that an
    /// edge still references fails with [`GraphError::DanglingEdge`] and the whole batch is
    /// dropped.
    pub fn apply_node_changes(&mut self, changes: Vec<NodeChange>) -> Result<(), GraphError> {
        const OP: &str = "apply_node_changes";
        let mut nodes = self.nodes.clone();
        for change in changes {
            match change {
                NodeChange::Position {
                    id,
                    position,
                    dragging,
                } => {
                    if let Some(node) = nodes.iter_mut().find(|n| n.id == id) {
                        if let Some(p) = position {
                            node.position = Some(p);
                        }
                        if let Some(d) = dragging {
                            node.dragging = d;
                        }
                    }
                }
                NodeChange::Select { id, selected } => {
                    if let Some(node) = nodes.iter_mut().find(|n| n.id == id) {
                        node.selected = selected;
                    }
                }
                NodeChange::Remove { id } => nodes.retain(|n| n.id != id),
                NodeChange::Add { node } => {
                    if nodes.iter().any(|n| n.id == node.id) {
                        return Err(GraphError::DuplicateNodeId(node.id));
                    }
                    nodes.push(node);
                }
                NodeChange::Replace { node } => {
                    let slot = nodes
                        .iter_mut()
                        .find(|n| n.id == node.id)
                        .ok_or_else(|| GraphError::NodeNotFound {
                            id: node.id.clone(),
                            operation: OP,
                        })?;
                    *slot = node;
                }
            }
        }
        let edges = self.edges.clone();
        self.stage(nodes, edges, OP)
    }

    /// Applies a batch of edge deltas atomically. Additions are fully integrity-checked.
    pub fn apply_edge_changes(&mut self, changes: Vec<EdgeChange>) -> Result<(), GraphError> {
        let mut edges = self.edges.clone();
        for change in changes {
            match change {
                EdgeChange::Add { edge } => edges.push(edge),
                EdgeChange::Remove { id } => edges.retain(|e| e.id != id),
                EdgeChange::Select { id, selected } => {
                    if let Some(edge) = edges.iter_mut().find(|e| e.id == id) {
                        edge.selected = selected;
                    }
                }
            }
        }
        let nodes = self.nodes.clone();
        self.stage(nodes, edges, "apply_edge_changes")
    }

    /// Adds `source -> target` and makes `source` the target's parent.
    pub fn connect(&mut self, connection: Connection) -> Result<Edge, GraphError> {
        const OP: &str = "connect";
        let mut edge = Edge::between(connection.source, connection.target);
        for endpoint in [&edge.source, &edge.target] {
            if !self.contains(endpoint) {
                return Err(GraphError::DanglingEdge {
                    edge_id: edge.id.clone(),
                    node_id: endpoint.clone(),
                    operation: OP,
                });
            }
        }
        if let Some(existing) = self.parent_of(&edge.target) {
            if existing == edge.source {
                return Err(GraphError::DuplicateEdgeId(edge.id));
            }
            return Err(GraphError::MultipleParents {
                target: edge.target.clone(),
                existing_parent: existing.to_string(),
                attempted_parent: edge.source.clone(),
            });
        }
        edge.id = self.free_edge_id(&edge.source, &edge.target);
        let nodes = self.nodes.clone();
        let mut edges = self.edges.clone();
        edges.push(edge.clone());
        self.stage(nodes, edges, OP)?;
        Ok(edge)
    }

    /// Canonical id for `source -> target`, or `{canonical}-{n}` when another pair already
    /// produced the same string (`a -> b-c` and `a-b -> c` both give `a-b-c`).
    fn free_edge_id(&self, source: &str, target: &str) -> String {
        let base = edge_id(source, target);
        let taken = |id: &str| self.edges.iter().any(|e| e.id == id);
        if !taken(base.as_str()) {
            return base;
        }
        let mut n = 1usize;
        loop {
            let candidate = format!("{}-{}", base, n);
            if !taken(candidate.as_str()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Creates one child of `parent_id` plus the parent → child edge; returns the child id.
    pub fn add_child_node(&mut self, parent_id: &str, data: NodeData) -> Result<String, GraphError> {
        if !self.contains(parent_id) {
            return Err(GraphError::ParentNotFound {
                parent_id: parent_id.to_string(),
            });
        }
        let mut ids = self.child_ids(parent_id, 1)?;
        let id = ids.remove(0);
        let node = Node::child(id.clone(), parent_id, data);
        let edge = Edge::between(parent_id, id.clone());
        self.commit_batch(vec![node], vec![edge])?;
        Ok(id)
    }

    /// Seeds a root node.
    pub fn add_root_node(&mut self, id: impl Into<String>, data: NodeData) -> Result<(), GraphError> {
        let mut nodes = self.nodes.clone();
        nodes.push(Node::root(id, data));
        let edges = self.edges.clone();
        self.stage(nodes, edges, "add_root_node")
    }

    /// User edit of a node's data; the node keeps its kind.
    pub fn update_node_data(&mut self, id: &str, data: NodeData) -> Result<(), GraphError> {
        let idx = *self.index.get(id).ok_or_else(|| GraphError::NodeNotFound {
            id: id.to_string(),
            operation: "update_node_data",
        })?;
        let node = &mut self.nodes[idx];
        if node.kind() != data.kind() {
            return Err(GraphError::TypeMismatch {
                id: id.to_string(),
                expected: node.kind(),
                actual: data.kind(),
            });
        }
        node.data = data;
        self.revision += 1;
        Ok(())
    }

    /// Inserts `nodes` and `edges` as one atomic batch; nothing is written unless every check passes.
    pub fn commit_batch(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<(), GraphError> {
        let mut all_nodes = self.nodes.clone();
        all_nodes.extend(nodes);
        let mut all_edges = self.edges.clone();
        all_edges.extend(edges);
        self.stage(all_nodes, all_edges, "commit_batch")
    }

    /// Layout write. Unknown ids are ignored; returns whether the node exists.
    pub fn set_position(&mut self, id: &str, position: Position) -> bool {
        match self.index.get(id) {
            Some(&i) => {
                self.nodes[i].position = Some(position);
                true
            }
            None => false,
        }
    }

    fn stage(
        &mut self,
        mut nodes: Vec<Node>,
        edges: Vec<Edge>,
        operation: &'static str,
    ) -> Result<(), GraphError> {
        let parents = check_integrity(&nodes, &edges, operation)?;
        for node in nodes.iter_mut() {
            node.parent_id = parents.get(node.id.as_str()).map(|p| p.to_string());
        }
        self.index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        self.nodes = nodes;
        self.edges = edges;
        self.revision += 1;
        Ok(())
    }
}

/// Checks the forest invariants; returns the child → parent map on success.
fn check_integrity<'e>(
    nodes: &[Node],
    edges: &'e [Edge],
    operation: &'static str,
) -> Result<HashMap<&'e str, &'e str>, GraphError> {
    let mut node_ids: HashSet<&str> = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !node_ids.insert(node.id.as_str()) {
            return Err(GraphError::DuplicateNodeId(node.id.clone()));
        }
    }

    let mut edge_ids: HashSet<&str> = HashSet::with_capacity(edges.len());
    let mut parents: HashMap<&str, &str> = HashMap::with_capacity(edges.len());
    for edge in edges {
        if !edge_ids.insert(edge.id.as_str()) {
            return Err(GraphError::DuplicateEdgeId(edge.id.clone()));
        }
        for endpoint in [&edge.source, &edge.target] {
            if !node_ids.contains(endpoint.as_str()) {
                return Err(GraphError::DanglingEdge {
                    edge_id: edge.id.clone(),
                    node_id: endpoint.clone(),
                    operation,
                });
            }
        }
        if let Some(existing) = parents.insert(edge.target.as_str(), edge.source.as_str()) {
            return Err(GraphError::MultipleParents {
                target: edge.target.clone(),
                existing_parent: existing.to_string(),
                attempted_parent: edge.source.clone(),
            });
        }
    }

    // Walk each node up to a root; nodes already proven to reach a root are skipped.
    let mut rooted: HashSet<&str> = HashSet::with_capacity(nodes.len());
    for node in nodes {
        let mut path: Vec<&str> = Vec::new();
        let mut on_path: HashSet<&str> = HashSet::new();
        let mut cur = node.id.as_str();
        while !rooted.contains(cur) {
            if !on_path.insert(cur) {
                let parent = parents.get(cur).copied().unwrap_or(cur);
                return Err(GraphError::Cycle {
                    parent: parent.to_string(),
                    child: cur.to_string(),
                });
            }
            path.push(cur);
            match parents.get(cur) {
                Some(&p) => cur = p,
                None => break,
            }
        }
        rooted.extend(path);
    }

    Ok(parents)
}
