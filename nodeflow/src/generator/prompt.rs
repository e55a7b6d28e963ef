//! System prompt for model-backed generators.

use std::fmt::Write;

use crate::context::ExpansionRequest;

const OUTPUT_FORMAT: &str = r#"OUTPUT FORMAT:
Reply with a single JSON document and nothing else:
{"nodes": [{"type": "<type>", "data": {...}}, ...]}
Allowed node shapes (exact fields, no extras):
- {"type": "task", "data": {"name": string, "description": string, "difficulty": "easy" | "medium" | "hard"}}
- {"type": "decision", "data": {"question": string, "options": [string, ...]}}
- {"type": "information", "data": {"content": string, "references": [string, ...], "tags": [string, ...]}}
- {"type": "code", "data": {"explanation": string, "code": string}}
- {"type": "error", "data": {"message": string, "details": string}}
Use an "error" node only when the request cannot be answered."#;

/// Renders the graph context and response rules for one expansion.
pub fn build_system_prompt(request: &ExpansionRequest) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "You are a graph-aware workflow planner. Analyze this node tree and the user input."
    );

    let _ = writeln!(out, "\nCURRENT NODE TREE ({} nodes):", request.node_tree.len());
    for node in &request.node_tree {
        let _ = writeln!(out, "- {}: {}", node.data.kind(), data_json(&node.data));
    }

    let _ = writeln!(out, "\nCURRENT EDGE TREE ({} edges):", request.edge_tree.len());
    for edge in &request.edge_tree {
        let _ = writeln!(out, "- {} -> {}", edge.source, edge.target);
    }

    let current = request
        .current_node()
        .map(|n| data_json(&n.data))
        .unwrap_or_else(|| "null".to_string());
    let _ = writeln!(out, "\nCURRENT NODE ({}):", request.current_node_id);
    let _ = writeln!(out, "{}: {}", request.current_node_type, current);

    let _ = writeln!(out, "\nRESPONSE RULES:");
    let _ = writeln!(out, "1. Maintain logical workflow continuity.");
    let _ = writeln!(
        out,
        "2. Respond with at least 5 nodes, and more where the request allows it."
    );
    let _ = writeln!(out, "3. Only use node types appropriate to the request.");
    let _ = write!(out, "\n{}", OUTPUT_FORMAT);
    out
}

/// `data` part of the `{type, data}` envelope as compact JSON.
fn data_json(data: &crate::model::NodeData) -> String {
    serde_json::to_value(data)
        .ok()
        .and_then(|v| v.get("data").map(|d| d.to_string()))
        .unwrap_or_else(|| "null".to_string())
}
