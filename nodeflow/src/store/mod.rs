//! Graph store: the single authoritative container for nodes and edges.

mod error;
mod graph_store;
mod ids;

pub use error::GraphError;
pub use graph_store::GraphStore;
pub use ids::{child_id, is_descendant_id, IdGenerator, RandomIds, SequentialIds};
