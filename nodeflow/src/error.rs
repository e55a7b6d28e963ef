//! Engine-level error type.
//!
//! Returned by [`FlowEngine`](crate::FlowEngine) user actions. Wraps the per-layer errors and
//! adds the checks that only make sense for a specific node kind.

use thiserror::Error;

use crate::layout::LayoutError;
use crate::model::NodeKind;
use crate::session::SessionError;
use crate::store::GraphError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// The action does not apply to this node kind.
    #[error("node '{id}' is a {actual} node; this action needs {expected}")]
    WrongNodeType {
        id: String,
        expected: &'static str,
        actual: NodeKind,
    },

    #[error("prompt for node '{id}' is empty")]
    EmptyPrompt { id: String },

    #[error("'{option}' is not an option of decision node '{id}'")]
    UnknownOption { id: String, option: String },
}
