//! Flow engine: owns the graph and wires user actions, expansions and layout together.
//!
//! Every mutation goes through the engine, which re-runs layout whenever the node count
//! changes and drops sessions whose parent disappeared. [`FlowEngine::run_until_idle`] is the
//! cooperative driver: it commits finished expansions and ticks the layout animation until
//! nothing is in flight.
//!
//! **Interaction**: A rendering surface calls `on_nodes_change` / `on_edges_change` /
//! `on_connect` and reads `nodes()` / `edges()`; node components call the user actions
//! (`submit_prompt`, `select_option`, `request_elaboration`, `add_prompt_node`).

mod viewport;

pub use viewport::{NoopViewport, RecordingViewport, Viewport};

use std::sync::Arc;

use crate::context::ChatMessage;
use crate::error::EngineError;
use crate::generator::Generator;
use crate::layout::{
    AnimationTicker, Clock, LayoutConfig, LayoutEngine, SystemClock, TickOutcome,
};
use crate::logging::log_fit_view;
use crate::model::{
    Connection, DecisionData, Edge, EdgeChange, Node, NodeChange, NodeData, NodeKind, PromptData,
};
use crate::session::{
    CommitSummary, ExpansionManager, SessionConfig, SessionError, SessionId, SessionReport,
    SessionState,
};
use crate::store::{GraphError, GraphStore, IdGenerator};

enum DriverEvent {
    Report(Option<SessionReport>),
    Tick,
}

/// Graph plus everything that mutates it.
pub struct FlowEngine {
    graph: GraphStore,
    sessions: ExpansionManager,
    layout: LayoutEngine,
    ticker: AnimationTicker,
    clock: Arc<dyn Clock>,
    viewport: Box<dyn Viewport>,
}

impl FlowEngine {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        let layout = LayoutConfig::default();
        Self {
            graph: GraphStore::new(),
            sessions: ExpansionManager::new(generator),
            ticker: AnimationTicker::new(layout.tick_interval),
            layout: LayoutEngine::new(layout),
            clock: Arc::new(SystemClock::new()),
            viewport: Box::new(NoopViewport),
        }
    }

    pub fn with_layout_config(mut self, config: LayoutConfig) -> Self {
        self.ticker = AnimationTicker::new(config.tick_interval);
        self.layout = LayoutEngine::new(config);
        self
    }

    pub fn with_session_config(mut self, config: SessionConfig) -> Self {
        let generator = Arc::clone(self.sessions.generator());
        self.sessions = ExpansionManager::with_config(generator, config);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_viewport(mut self, viewport: impl Viewport + 'static) -> Self {
        self.viewport = Box::new(viewport);
        self
    }

    /// Replaces the (empty) graph with one using `ids` for child ids. Call before seeding.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.graph = GraphStore::with_id_generator(ids);
        self
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    pub fn nodes(&self) -> &[Node] {
        self.graph.nodes()
    }

    pub fn edges(&self) -> &[Edge] {
        self.graph.edges()
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.graph.get_node(id)
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn session_state(&self, node_id: &str) -> SessionState {
        self.sessions.state(node_id)
    }

    /// True when no expansion is in flight and no animation is running.
    pub fn is_idle(&self) -> bool {
        !self.sessions.has_active() && !self.layout.is_animating()
    }

    /// Adds a root node.
    pub fn seed_root(&mut self, id: impl Into<String>, data: NodeData) -> Result<(), EngineError> {
        self.graph.add_root_node(id, data)?;
        self.after_mutation();
        Ok(())
    }

    /// Node deltas from the rendering surface. Sessions whose parent was removed are cancelled,
    /// even when the same batch adds a new node under the old id.
    pub fn on_nodes_change(&mut self, changes: Vec<NodeChange>) -> Result<(), EngineError> {
        let removed: Vec<String> = changes
            .iter()
            .filter_map(|c| match c {
                NodeChange::Remove { id } => Some(id.clone()),
                _ => None,
            })
            .collect();
        self.graph.apply_node_changes(changes)?;
        for id in &removed {
            self.sessions.cancel(id);
        }
        self.sessions.cancel_orphans(&self.graph);
        self.after_mutation();
        Ok(())
    }

    pub fn on_edges_change(&mut self, changes: Vec<EdgeChange>) -> Result<(), EngineError> {
        self.graph.apply_edge_changes(changes)?;
        self.after_mutation();
        Ok(())
    }

    /// Manual connection drawn on the rendering surface.
    pub fn on_connect(&mut self, connection: Connection) -> Result<Edge, EngineError> {
        let edge = self.graph.connect(connection)?;
        self.after_mutation();
        Ok(edge)
    }

    /// "Add prompt" action: an empty prompt child under `parent_id`.
    pub fn add_prompt_node(&mut self, parent_id: &str) -> Result<String, EngineError> {
        let id = self
            .graph
            .add_child_node(parent_id, NodeData::empty_prompt())?;
        self.after_mutation();
        Ok(id)
    }

    pub fn update_node_data(&mut self, id: &str, data: NodeData) -> Result<(), EngineError> {
        self.graph.update_node_data(id, data)?;
        Ok(())
    }

    /// Stores `text` in prompt node `id` and expands it.
    pub fn submit_prompt(&mut self, id: &str, text: &str) -> Result<SessionId, EngineError> {
        self.expect_kind(id, &[NodeKind::Prompt], "a prompt node")?;
        if text.trim().is_empty() {
            return Err(EngineError::EmptyPrompt { id: id.to_string() });
        }
        self.ensure_not_busy(id)?;
        self.graph.update_node_data(
            id,
            NodeData::Prompt(PromptData {
                prompt: text.to_string(),
            }),
        )?;
        self.expand(id, ChatMessage::user(text))
    }

    /// Expands decision node `id` with the chosen option.
    pub fn select_option(&mut self, id: &str, option: &str) -> Result<SessionId, EngineError> {
        let kind = self.expect_kind(id, &[NodeKind::Decision], "a decision node")?;
        let Some(NodeData::Decision(DecisionData { question, options })) =
            self.graph.get_node(id).map(|n| &n.data)
        else {
            return Err(EngineError::WrongNodeType {
                id: id.to_string(),
                expected: "a decision node",
                actual: kind,
            });
        };
        if !options.iter().any(|o| o == option) {
            return Err(EngineError::UnknownOption {
                id: id.to_string(),
                option: option.to_string(),
            });
        }
        let question = question.clone();
        let message = format!(
            "Selected option: \"{}\" for the question: \"{}\"",
            option, question
        );
        self.expand(id, ChatMessage::user(message))
    }

    /// Asks for more detail on a task, information or code node.
    pub fn request_elaboration(
        &mut self,
        id: &str,
        instruction: Option<&str>,
    ) -> Result<SessionId, EngineError> {
        let kind = self.expect_kind(
            id,
            &[NodeKind::Task, NodeKind::Information, NodeKind::Code],
            "a task, information or code node",
        )?;
        let message = match instruction.map(str::trim).filter(|s| !s.is_empty()) {
            Some(text) => text.to_string(),
            None => format!("Elaborate on this {} node.", kind),
        };
        self.expand(id, ChatMessage::user(message))
    }

    /// Cancels the expansion of `id`; returns whether one was in flight.
    pub fn cancel_expansion(&mut self, id: &str) -> bool {
        self.sessions.cancel(id)
    }

    /// Forces a layout pass now.
    pub fn relayout(&mut self) -> Result<(), EngineError> {
        self.layout.relayout(&self.graph, self.clock.now_ms())?;
        Ok(())
    }

    /// Advances the layout animation to the clock's current time.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.layout.tick(&mut self.graph, self.clock.now_ms());
        match outcome {
            TickOutcome::Idle => self.ticker.stop(),
            TickOutcome::Running => {}
            TickOutcome::Finished { fit_view } => {
                self.ticker.stop();
                if let Some(options) = fit_view {
                    log_fit_view(&options);
                    self.viewport.fit_view(options, self.graph.nodes());
                }
            }
        }
        outcome
    }

    /// Commits one finished expansion and re-runs layout.
    pub fn commit_report(&mut self, report: SessionReport) -> Result<CommitSummary, SessionError> {
        let summary = self.sessions.commit(&mut self.graph, report)?;
        self.after_mutation();
        Ok(summary)
    }

    /// Drives expansions and animation until both are idle; returns every commit outcome.
    ///
    /// Must run inside a tokio runtime (current-thread is enough).
    pub async fn run_until_idle(&mut self) -> Vec<Result<CommitSummary, SessionError>> {
        let mut outcomes = Vec::new();
        loop {
            if self.layout.is_animating() && !self.ticker.is_running() {
                self.ticker.start();
            }
            let event = tokio::select! {
                report = self.sessions.next_report(), if self.sessions.has_active() => {
                    DriverEvent::Report(report)
                }
                _ = self.ticker.tick(), if self.ticker.is_running() => DriverEvent::Tick,
                else => break,
            };
            match event {
                DriverEvent::Report(Some(report)) => {
                    outcomes.push(self.commit_report(report));
                    if self.layout.is_animating() {
                        // new pass: restart the timer with it
                        self.ticker.start();
                    }
                }
                DriverEvent::Report(None) => {}
                DriverEvent::Tick => {
                    self.tick();
                }
            }
        }
        self.ticker.stop();
        outcomes
    }

    fn expand(&mut self, id: &str, message: ChatMessage) -> Result<SessionId, EngineError> {
        Ok(self.sessions.submit(&self.graph, id, vec![message])?)
    }

    fn ensure_not_busy(&self, id: &str) -> Result<(), EngineError> {
        if self.sessions.state(id).is_active() {
            return Err(SessionError::Busy {
                parent_id: id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn expect_kind(
        &self,
        id: &str,
        allowed: &[NodeKind],
        expected: &'static str,
    ) -> Result<NodeKind, EngineError> {
        let node = self.graph.get_node(id).ok_or_else(|| GraphError::NodeNotFound {
            id: id.to_string(),
            operation: expected,
        })?;
        let kind = node.kind();
        if !allowed.contains(&kind) {
            return Err(EngineError::WrongNodeType {
                id: id.to_string(),
                expected,
                actual: kind,
            });
        }
        Ok(kind)
    }

    fn after_mutation(&mut self) {
        // errors are logged by the layout engine; the mutation itself stands
        let _ = self
            .layout
            .relayout_if_needed(&self.graph, self.clock.now_ms());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::MockGenerator;
    use crate::layout::ManualClock;
    use crate::model::{Difficulty, TaskData};
    use crate::store::SequentialIds;

    /// Lets spawned expansion tasks reach the generator.
    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    fn engine(records: Vec<serde_json::Value>) -> (FlowEngine, MockGenerator) {
        let gen = MockGenerator::with_records(records);
        let e = FlowEngine::new(Arc::new(gen.clone()))
            .with_id_generator(Arc::new(SequentialIds::new()))
            .with_clock(Arc::new(ManualClock::new()));
        (e, gen)
    }

    fn task() -> NodeData {
        NodeData::Task(TaskData {
            name: "t".into(),
            description: "d".into(),
            difficulty: Difficulty::Hard,
        })
    }

    /// **Scenario**: Actions on the wrong node kind fail with WrongNodeType.
    #[tokio::test]
    async fn actions_check_node_kind() {
        let (mut e, _) = engine(vec![]);
        e.seed_root("R", NodeData::empty_prompt()).unwrap();
        assert!(matches!(
            e.select_option("R", "a"),
            Err(EngineError::WrongNodeType { .. })
        ));
        assert!(matches!(
            e.request_elaboration("R", None),
            Err(EngineError::WrongNodeType { .. })
        ));
        assert!(matches!(
            e.submit_prompt("missing", "x"),
            Err(EngineError::Graph(GraphError::NodeNotFound { .. }))
        ));
    }

    /// **Scenario**: A whitespace prompt is rejected and nothing is submitted.
    #[tokio::test]
    async fn blank_prompt_is_rejected() {
        let (mut e, gen) = engine(vec![]);
        e.seed_root("R", NodeData::empty_prompt()).unwrap();
        assert!(matches!(
            e.submit_prompt("R", "   "),
            Err(EngineError::EmptyPrompt { .. })
        ));
        assert!(gen.requests().is_empty());
    }

    /// **Scenario**: submit_prompt stores the text and sends it as the user message.
    #[tokio::test]
    async fn submit_prompt_stores_text() {
        let (mut e, gen) = engine(vec![]);
        e.seed_root("R", NodeData::empty_prompt()).unwrap();
        e.submit_prompt("R", "plan a trip").unwrap();
        assert_eq!(e.get_node("R").unwrap().data.title(), "plan a trip");
        settle().await;
        let reqs = gen.requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].messages[0].content, "plan a trip");
        assert_eq!(reqs[0].current_node_type, NodeKind::Prompt);
    }

    /// **Scenario**: select_option formats the message and rejects unknown options.
    #[tokio::test]
    async fn select_option_message() {
        let (mut e, gen) = engine(vec![]);
        e.seed_root(
            "D",
            NodeData::Decision(DecisionData {
                question: "Which stack?".into(),
                options: vec!["Rust".into(), "Go".into()],
            }),
        )
        .unwrap();
        assert!(matches!(
            e.select_option("D", "Java"),
            Err(EngineError::UnknownOption { .. })
        ));
        e.select_option("D", "Rust").unwrap();
        settle().await;
        assert_eq!(
            gen.requests()[0].messages[0].content,
            "Selected option: \"Rust\" for the question: \"Which stack?\""
        );
    }

    /// **Scenario**: select_option on a non-decision node fails with WrongNodeType and sends
    /// nothing to the generator.
    #[tokio::test]
    async fn select_option_rejects_non_decision() {
        let (mut e, gen) = engine(vec![]);
        e.seed_root("T", task()).unwrap();
        match e.select_option("T", "Rust") {
            Err(EngineError::WrongNodeType {
                id,
                expected,
                actual,
            }) => {
                assert_eq!(id, "T");
                assert_eq!(expected, "a decision node");
                assert_eq!(actual, NodeKind::Task);
            }
            other => panic!("expected WrongNodeType, got {:?}", other.map(|_| ())),
        }
        settle().await;
        assert!(gen.requests().is_empty());
        assert_eq!(e.session_state("T"), SessionState::Idle);
    }

    /// **Scenario**: request_elaboration falls back to a default message per kind.
    #[tokio::test]
    async fn elaboration_default_message() {
        let (mut e, gen) = engine(vec![]);
        e.seed_root("T", task()).unwrap();
        e.request_elaboration("T", None).unwrap();
        settle().await;
        assert_eq!(
            gen.requests()[0].messages[0].content,
            "Elaborate on this task node."
        );
    }

    /// **Scenario**: add_prompt_node adds an empty prompt child and triggers a layout pass.
    #[tokio::test]
    async fn add_prompt_node_relayouts() {
        let (mut e, _) = engine(vec![]);
        e.seed_root("T", task()).unwrap();
        e.tick();
        let id = e.add_prompt_node("T").unwrap();
        assert_eq!(id, "T-1");
        assert_eq!(e.get_node(&id).unwrap().kind(), NodeKind::Prompt);
        assert!(e.layout().is_animating());
        assert!(!e.layout().needs_layout(e.graph()));
    }

    /// **Scenario**: Removing the expanding node cancels its session.
    #[tokio::test]
    async fn removing_parent_cancels_session() {
        let gen = MockGenerator::new(vec![]).hanging();
        let mut e = FlowEngine::new(Arc::new(gen));
        e.seed_root("R", NodeData::empty_prompt()).unwrap();
        e.submit_prompt("R", "x").unwrap();
        assert_eq!(e.session_state("R"), SessionState::Submitting);
        e.on_nodes_change(vec![NodeChange::Remove { id: "R".into() }])
            .unwrap();
        assert_eq!(e.session_state("R"), SessionState::Idle);
        assert!(e.run_until_idle().await.is_empty());
    }

    /// **Scenario**: A second action on a busy node is rejected without touching the prompt.
    #[tokio::test]
    async fn busy_node_rejects_second_submit() {
        let gen = MockGenerator::new(vec![]).hanging();
        let mut e = FlowEngine::new(Arc::new(gen));
        e.seed_root("R", NodeData::empty_prompt()).unwrap();
        e.submit_prompt("R", "first").unwrap();
        assert!(matches!(
            e.submit_prompt("R", "second"),
            Err(EngineError::Session(SessionError::Busy { .. }))
        ));
        assert_eq!(e.get_node("R").unwrap().data.title(), "first");
        assert!(e.cancel_expansion("R"));
    }
}
