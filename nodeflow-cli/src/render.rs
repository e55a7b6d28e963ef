//! Text and JSON output for a finished run.

use std::collections::HashMap;
use std::fmt::Write;

use nodeflow::{Edge, Node};
use serde_json::json;

use crate::run::RunOutput;

/// Indented tree, one node per line: `[kind] title (id) @ (x, y)`.
///
/// Roots are nodes without an incoming edge; children follow edge order.
pub fn render_tree(output: &RunOutput) -> String {
    let by_id: HashMap<&str, &Node> = output.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for Edge { source, target, .. } in &output.edges {
        children.entry(source.as_str()).or_default().push(target.as_str());
    }

    let mut out = String::new();
    for root in output.nodes.iter().filter(|n| n.parent_id.is_none()) {
        let mut stack = vec![(root.id.as_str(), 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = by_id.get(id) else { continue };
            let _ = writeln!(out, "{}{}", "  ".repeat(depth), node_line(node));
            if let Some(kids) = children.get(id) {
                stack.extend(kids.iter().rev().map(|k| (*k, depth + 1)));
            }
        }
    }
    out
}

/// `{"nodes": [...], "edges": [...], "rejected": n}`.
pub fn render_json(output: &RunOutput) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "nodes": output.nodes,
        "edges": output.edges,
        "rejected": output.rejected,
    }))
}

fn node_line(node: &Node) -> String {
    let title = node.data.title().lines().next().unwrap_or("");
    match node.position {
        Some(p) => format!(
            "[{}] {} ({}) @ ({:.1}, {:.1})",
            node.kind(),
            title,
            node.id,
            p.x,
            p.y
        ),
        None => format!("[{}] {} ({})", node.kind(), title, node.id),
    }
}
