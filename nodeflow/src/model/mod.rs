//! Graph data model: nodes, edges, positions and change deltas.

mod change;
mod edge;
mod node;
mod position;

pub use change::{EdgeChange, NodeChange};
pub use edge::{edge_id, Connection, Edge};
pub use node::{
    CodeData, DecisionData, Difficulty, ErrorData, InformationData, Node, NodeData, NodeKind,
    PromptData, TaskData,
};
pub use position::Position;
