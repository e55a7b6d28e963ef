//! # Nodeflow
//!
//! An interactive workflow-graph engine. A user types a prompt into a root node; a
//! generator streams back typed child nodes (tasks, decisions, information, code, errors)
//! which are validated, attached under the parent and laid out as an animated tidy tree.
//! Any node can be expanded again, so the graph grows one streamed expansion at a time.
//!
//! ## Design Principles
//!
//! - **Forest invariant**: Every node has at most one parent and the graph never contains a
//!   cycle. [`GraphStore`] checks this on every mutation and rejects the whole change otherwise.
//! - **All-or-nothing expansions**: An expansion streams records into a session, validates
//!   them when the stream completes and commits the accepted ones in a single batch.
//! - **One session per parent**: A second expansion of the same node is refused while the
//!   first is in flight; expansions of different nodes run concurrently.
//! - **Layout follows structure**: Layout re-runs when the node count changes and animates
//!   from the current positions to the new targets.
//!
//! ## Main Modules
//!
//! - [`model`]: `Node`, `NodeData`, `Edge`, `Position` and the change deltas a UI emits.
//! - [`store`]: `GraphStore`, the single owner of nodes and edges, and child id generation.
//! - [`context`]: Graph context for an expansion (every node outside the expanding node's own
//!   `{id}-` descendants) and the `ExpansionRequest` sent to a generator.
//! - [`generator`]: `Generator` trait, `MockGenerator`, the streaming record assembler and
//!   optional `OpenAiGenerator` (feature `openai`).
//! - [`schema`]: `SchemaValidator`, the per-kind shape checks for generated records.
//! - [`session`]: `ExpansionManager`, the per-parent expansion lifecycle.
//! - [`layout`]: Tidy-tree placement, transitions and the animation ticker.
//! - [`engine`]: `FlowEngine`, the facade that wires all of the above together.
//!
//! ## Features
//!
//! - `tracing` (default): Structured logging via the `tracing` crate; falls back to stderr.
//! - `openai`: OpenAI-compatible streaming generator via `async-openai`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use nodeflow::{FlowEngine, MockGenerator, NodeData, PromptData};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let generator = MockGenerator::with_records(vec![
//!     json!({"type": "task", "data": {"name": "Design", "description": "Sketch it", "difficulty": "easy"}}),
//! ]);
//! let mut engine = FlowEngine::new(Arc::new(generator));
//! engine.seed_root("1", NodeData::Prompt(PromptData::default()))?;
//! engine.submit_prompt("1", "Build a bike shed")?;
//! for result in engine.run_until_idle().await {
//!     println!("{:?}", result?.node_ids);
//! }
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod generator;
pub mod layout;
pub mod logging;
pub mod model;
pub mod schema;
pub mod session;
pub mod store;

pub use context::{
    build_request, extract_context, ChatMessage, ContextEdge, ContextNode, ExpansionContext,
    ExpansionRequest, Role,
};
pub use engine::{FlowEngine, NoopViewport, RecordingViewport, Viewport};
pub use error::EngineError;
#[cfg(feature = "openai")]
pub use generator::OpenAiGenerator;
pub use generator::{
    build_system_prompt, GenerationEvent, GenerationStream, Generator, GeneratorError,
    MockGenerator, RecordAssembler,
};
pub use layout::{
    layout_forest, AnimationTicker, Clock, FitViewOptions, LayoutConfig, LayoutEngine,
    LayoutError, ManualClock, SystemClock, TickOutcome, TreeLayout,
};
pub use model::{
    Connection, Edge, EdgeChange, Node, NodeChange, NodeData, NodeKind, Position, PromptData,
};
pub use schema::{BatchValidation, RejectReason, SchemaValidator, ValidationRejected};
pub use session::{
    CommitSummary, ExpansionManager, SessionConfig, SessionError, SessionId, SessionReport,
    SessionState,
};
pub use store::{GraphError, GraphStore, IdGenerator, RandomIds, SequentialIds};
