//! Workflow nodes: the closed set of node kinds and their data shapes.
//!
//! `NodeData` is a tagged union: the `type` discriminant selects exactly one data
//! shape, so a node's data always conforms to its kind. Every shape except
//! [`ErrorData`] denies unknown fields; see [`crate::schema`] for how raw generator
//! records are turned into `NodeData`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Position;

/// Node kind: the `type` field of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Prompt,
    Task,
    Decision,
    Information,
    Code,
    /// Diagnostic emitted by the generator instead of workflow nodes.
    Error,
}

impl NodeKind {
    pub const ALL: [NodeKind; 6] = [
        NodeKind::Prompt,
        NodeKind::Task,
        NodeKind::Decision,
        NodeKind::Information,
        NodeKind::Code,
        NodeKind::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Prompt => "prompt",
            NodeKind::Task => "task",
            NodeKind::Decision => "decision",
            NodeKind::Information => "information",
            NodeKind::Code => "code",
            NodeKind::Error => "error",
        }
    }

    /// True for `error` nodes, which are shown as diagnostics rather than workflow steps.
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, NodeKind::Error)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown node type: {}", s))
    }
}

/// Task difficulty; only these three literals are accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromptData {
    pub prompt: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskData {
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecisionData {
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InformationData {
    pub content: String,
    pub references: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodeData {
    pub explanation: String,
    pub code: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorData {
    pub message: String,
    pub details: String,
}

/// Node payload: `type` discriminant plus the matching data shape.
///
/// Serializes as `{"type": "...", "data": {...}}`, the same envelope the generator produces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum NodeData {
    Prompt(PromptData),
    Task(TaskData),
    Decision(DecisionData),
    Information(InformationData),
    Code(CodeData),
    Error(ErrorData),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Prompt(_) => NodeKind::Prompt,
            NodeData::Task(_) => NodeKind::Task,
            NodeData::Decision(_) => NodeKind::Decision,
            NodeData::Information(_) => NodeKind::Information,
            NodeData::Code(_) => NodeKind::Code,
            NodeData::Error(_) => NodeKind::Error,
        }
    }

    /// Empty prompt, used by the "add prompt" action.
    pub fn empty_prompt() -> Self {
        NodeData::Prompt(PromptData::default())
    }

    /// Short human-readable label (prompt text, task name, question, ...).
    pub fn title(&self) -> &str {
        match self {
            NodeData::Prompt(d) => &d.prompt,
            NodeData::Task(d) => &d.name,
            NodeData::Decision(d) => &d.question,
            NodeData::Information(d) => &d.content,
            NodeData::Code(d) => &d.explanation,
            NodeData::Error(d) => &d.message,
        }
    }
}

/// A node in the workflow graph.
///
/// `position` is `None` until the first layout pass that sees the node; afterwards only
/// the layout engine (and drag changes from the rendering surface) write it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(flatten)]
    pub data: NodeData,
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub selected: bool,
    pub dragging: bool,
}

impl Node {
    /// Seed node without a parent.
    pub fn root(id: impl Into<String>, data: NodeData) -> Self {
        Self {
            id: id.into(),
            data,
            position: None,
            parent_id: None,
            selected: false,
            dragging: false,
        }
    }

    /// Node spawned under `parent_id`.
    pub fn child(id: impl Into<String>, parent_id: impl Into<String>, data: NodeData) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            ..Self::root(id, data)
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}
