//! Context extraction: the bounded view of the graph sent to the generator.
//!
//! For an expanding node `id`, the context keeps `id` itself and every node that is not in
//! its own lineage (ids starting with `${id}-`), plus the edges whose target survives. A node
//! is never fed its previously generated descendants.

use serde::{Deserialize, Serialize};

use crate::model::{Edge, NodeData, NodeKind};
use crate::store::{is_descendant_id, GraphError, GraphStore};

/// Node as seen by the generator: id plus the `{type, data}` envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextNode {
    pub id: String,
    #[serde(flatten)]
    pub data: NodeData,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl From<&Edge> for ContextEdge {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
        }
    }
}

/// Output of [`extract_context`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionContext {
    pub context_nodes: Vec<ContextNode>,
    pub context_edges: Vec<ContextEdge>,
}

/// Bounded context for expanding `id`. Pure; works even when `id` is not in the graph.
pub fn extract_context(graph: &GraphStore, id: &str) -> ExpansionContext {
    let context_nodes = graph
        .nodes()
        .iter()
        .filter(|n| !is_descendant_id(&n.id, id))
        .map(|n| ContextNode {
            id: n.id.clone(),
            data: n.data.clone(),
        })
        .collect();
    let context_edges = graph
        .edges()
        .iter()
        .filter(|e| !is_descendant_id(&e.target, id))
        .map(ContextEdge::from)
        .collect();
    ExpansionContext {
        context_nodes,
        context_edges,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One conversation message sent with an expansion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Full generation request; camelCase on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionRequest {
    pub messages: Vec<ChatMessage>,
    pub node_tree: Vec<ContextNode>,
    pub edge_tree: Vec<ContextEdge>,
    pub current_node_id: String,
    pub current_node_type: NodeKind,
}

impl ExpansionRequest {
    /// Data of the expanding node, looked up in the context it carries.
    pub fn current_node(&self) -> Option<&ContextNode> {
        self.node_tree.iter().find(|n| n.id == self.current_node_id)
    }
}

/// Assembles the request for expanding `id` with `messages`.
pub fn build_request(
    graph: &GraphStore,
    id: &str,
    messages: Vec<ChatMessage>,
) -> Result<ExpansionRequest, GraphError> {
    let node = graph.get_node(id).ok_or_else(|| GraphError::NodeNotFound {
        id: id.to_string(),
        operation: "build_request",
    })?;
    let current_node_type = node.kind();
    let ctx = extract_context(graph, id);
    Ok(ExpansionRequest {
        messages,
        node_tree: ctx.context_nodes,
        edge_tree: ctx.context_edges,
        current_node_id: id.to_string(),
        current_node_type,
    })
}
