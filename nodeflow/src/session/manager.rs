//! Expansion manager: at most one streaming session per parent node.
//!
//! Each submit spawns a task that drains the generator stream, validates the records and
//! sends a [`SessionReport`] back over an mpsc channel. The owner awaits reports with
//! [`ExpansionManager::next_report`] and applies them with [`ExpansionManager::commit`], so
//! the [`GraphStore`] keeps a single writer and is never shared with the tasks.
//!
//! Cancellation is idempotent: the session entry is dropped and its token cancelled. A
//! report from a cancelled, superseded or orphaned session never reaches the store.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::StreamExt;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use super::error::SessionError;
use super::state::{SessionConfig, SessionId, SessionState};
use crate::context::{build_request, ChatMessage, ExpansionRequest};
use crate::generator::{GenerationEvent, Generator};
use crate::logging::{
    log_record_overflow, log_record_rejected, log_report_discarded, log_session_cancelled,
    log_session_committed, log_session_failed, log_session_streaming, log_session_submitted,
};
use crate::model::{Edge, Node, NodeData};
use crate::schema::{SchemaValidator, ValidationRejected};
use crate::store::GraphStore;

/// Validated output of a completed stream.
#[derive(Clone, Debug, PartialEq)]
pub struct FinalizedBatch {
    pub accepted: Vec<NodeData>,
    pub rejected: Vec<ValidationRejected>,
}

/// Outcome of one streaming task, handed back to the owner.
#[derive(Clone, Debug)]
pub struct SessionReport {
    pub session_id: SessionId,
    pub parent_id: String,
    pub outcome: Result<FinalizedBatch, SessionError>,
}

/// What a successful commit added to the graph.
#[derive(Clone, Debug, PartialEq)]
pub struct CommitSummary {
    pub session_id: SessionId,
    pub parent_id: String,
    /// New child ids, in stream order.
    pub node_ids: Vec<String>,
    pub edge_ids: Vec<String>,
    pub rejected: Vec<ValidationRejected>,
    /// How many of the new nodes are `error` diagnostics.
    pub diagnostics: usize,
}

struct ActiveSession {
    id: SessionId,
    cancel: CancellationToken,
    state: Arc<watch::Sender<SessionState>>,
}

/// Owns the per-parent session table and the report channel.
pub struct ExpansionManager {
    generator: Arc<dyn Generator>,
    validator: SchemaValidator,
    config: SessionConfig,
    sessions: HashMap<String, ActiveSession>,
    next_id: u64,
    report_tx: mpsc::Sender<SessionReport>,
    report_rx: mpsc::Receiver<SessionReport>,
}

impl fmt::Debug for ExpansionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpansionManager")
            .field("config", &self.config)
            .field("sessions", &self.sessions.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl ExpansionManager {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self::with_config(generator, SessionConfig::default())
    }

    pub fn with_config(generator: Arc<dyn Generator>, config: SessionConfig) -> Self {
        let (report_tx, report_rx) = mpsc::channel(config.channel_capacity.max(1));
        Self {
            generator,
            validator: SchemaValidator::new(),
            config,
            sessions: HashMap::new(),
            next_id: 1,
            report_tx,
            report_rx,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn generator(&self) -> &Arc<dyn Generator> {
        &self.generator
    }

    /// Starts an expansion of `parent_id`. Must be called inside a tokio runtime.
    ///
    /// Fails with [`SessionError::Busy`] while another session for the same parent is in flight.
    pub fn submit(
        &mut self,
        graph: &GraphStore,
        parent_id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<SessionId, SessionError> {
        if self.state(parent_id).is_active() {
            return Err(SessionError::Busy {
                parent_id: parent_id.to_string(),
            });
        }
        let request =
            build_request(graph, parent_id, messages).map_err(|_| SessionError::ParentNotFound {
                parent_id: parent_id.to_string(),
            })?;

        let id = SessionId(self.next_id);
        self.next_id += 1;
        let cancel = CancellationToken::new();
        let (state, _) = watch::channel(SessionState::Submitting);
        let state = Arc::new(state);

        log_session_submitted(id, parent_id);
        tokio::spawn(run_session(SessionTask {
            id,
            generator: Arc::clone(&self.generator),
            validator: self.validator,
            max_records: self.config.max_records,
            timeout: self.config.timeout,
            request,
            cancel: cancel.clone(),
            state: Arc::clone(&state),
            reports: self.report_tx.clone(),
        }));

        self.sessions.insert(
            parent_id.to_string(),
            ActiveSession { id, cancel, state },
        );
        Ok(id)
    }

    /// Cancels the session for `parent_id`, if any. Returns whether one was in flight.
    pub fn cancel(&mut self, parent_id: &str) -> bool {
        match self.sessions.remove(parent_id) {
            Some(session) => {
                let was_active = session.state.borrow().is_active();
                session.cancel.cancel();
                session.state.send_replace(SessionState::Idle);
                if was_active {
                    log_session_cancelled(session.id, parent_id);
                }
                was_active
            }
            None => false,
        }
    }

    /// Cancels every session whose parent is no longer in `graph`; returns their parent ids.
    pub fn cancel_orphans(&mut self, graph: &GraphStore) -> Vec<String> {
        let orphans: Vec<String> = self
            .sessions
            .keys()
            .filter(|p| !graph.contains(p))
            .cloned()
            .collect();
        for parent in &orphans {
            self.cancel(parent);
        }
        orphans
    }

    /// Current state for `parent_id`; `Idle` when no session exists.
    pub fn state(&self, parent_id: &str) -> SessionState {
        self.sessions
            .get(parent_id)
            .map(|s| *s.state.borrow())
            .unwrap_or(SessionState::Idle)
    }

    /// Watch channel for state changes of the current session of `parent_id`.
    pub fn subscribe(&self, parent_id: &str) -> Option<watch::Receiver<SessionState>> {
        self.sessions.get(parent_id).map(|s| s.state.subscribe())
    }

    pub fn has_active(&self) -> bool {
        self.sessions.values().any(|s| s.state.borrow().is_active())
    }

    /// Waits for the next report from a live session. Stale reports are dropped here.
    ///
    /// Returns `None` immediately when no session is in flight.
    pub async fn next_report(&mut self) -> Option<SessionReport> {
        loop {
            if !self.has_active() {
                return None;
            }
            let report = self.report_rx.recv().await?;
            if self.is_live(&report) {
                return Some(report);
            }
            log_report_discarded(report.session_id, &report.parent_id);
        }
    }

    /// Applies a report to the graph as one atomic batch.
    ///
    /// Stale reports are rejected with [`SessionError::Cancelled`]. If the parent left the
    /// graph the session is dropped and nothing is written.
    pub fn commit(
        &mut self,
        graph: &mut GraphStore,
        report: SessionReport,
    ) -> Result<CommitSummary, SessionError> {
        let SessionReport {
            session_id,
            parent_id,
            outcome,
        } = report;

        let state = match self.sessions.get(&parent_id) {
            Some(s) if s.id == session_id && !s.cancel.is_cancelled() => Arc::clone(&s.state),
            _ => {
                log_report_discarded(session_id, &parent_id);
                return Err(SessionError::Cancelled { parent_id });
            }
        };

        let fail = |error: SessionError| {
            state.send_replace(SessionState::Failed);
            log_session_failed(session_id, &error);
            error
        };

        let batch = outcome.map_err(fail)?;

        if !graph.contains(&parent_id) {
            self.cancel(&parent_id);
            return Err(SessionError::ParentNotFound { parent_id });
        }

        let node_ids = graph
            .child_ids(&parent_id, batch.accepted.len())
            .map_err(|e| fail(SessionError::Graph(e)))?;
        let diagnostics = batch
            .accepted
            .iter()
            .filter(|d| d.kind().is_diagnostic())
            .count();
        let edges: Vec<Edge> = node_ids
            .iter()
            .map(|id| Edge::between(parent_id.clone(), id.clone()))
            .collect();
        let edge_ids = edges.iter().map(|e| e.id.clone()).collect();
        let nodes: Vec<Node> = node_ids
            .iter()
            .zip(batch.accepted)
            .map(|(id, data)| Node::child(id.clone(), parent_id.clone(), data))
            .collect();

        graph
            .commit_batch(nodes, edges)
            .map_err(|e| fail(SessionError::Graph(e)))?;

        state.send_replace(SessionState::Committed);
        log_session_committed(session_id, &parent_id, node_ids.len(), batch.rejected.len());
        Ok(CommitSummary {
            session_id,
            parent_id,
            node_ids,
            edge_ids,
            rejected: batch.rejected,
            diagnostics,
        })
    }

    fn is_live(&self, report: &SessionReport) -> bool {
        self.sessions
            .get(&report.parent_id)
            .map_or(false, |s| s.id == report.session_id && !s.cancel.is_cancelled())
    }
}

impl Drop for ExpansionManager {
    fn drop(&mut self) {
        for session in self.sessions.values() {
            session.cancel.cancel();
        }
    }
}

struct SessionTask {
    id: SessionId,
    generator: Arc<dyn Generator>,
    validator: SchemaValidator,
    max_records: usize,
    timeout: Option<std::time::Duration>,
    request: ExpansionRequest,
    cancel: CancellationToken,
    state: Arc<watch::Sender<SessionState>>,
    reports: mpsc::Sender<SessionReport>,
}

async fn run_session(task: SessionTask) {
    let parent_id = task.request.current_node_id.clone();
    let work = async {
        let collected = collect_records(&task, &parent_id);
        match task.timeout {
            Some(limit) => match tokio::time::timeout(limit, collected).await {
                Ok(result) => result,
                Err(_) => Err(SessionError::StreamTransport {
                    parent_id: parent_id.clone(),
                    message: format!("timed out after {}s", limit.as_secs_f64()),
                }),
            },
            None => collected.await,
        }
    };

    let collected = tokio::select! {
        _ = task.cancel.cancelled() => return,
        result = work => result,
    };

    let outcome = collected.and_then(|records| {
        task.state.send_replace(SessionState::Finalizing);
        let validation = task.validator.validate_batch(&records);
        for rejected in &validation.rejected {
            log_record_rejected(&parent_id, rejected);
        }
        if validation.accepted.is_empty() {
            return Err(SessionError::NoAcceptedRecords {
                parent_id: parent_id.clone(),
                rejected: validation.rejected,
            });
        }
        Ok(FinalizedBatch {
            accepted: validation.accepted,
            rejected: validation.rejected,
        })
    });

    let report = SessionReport {
        session_id: task.id,
        parent_id,
        outcome,
    };
    tokio::select! {
        _ = task.cancel.cancelled() => {}
        _ = task.reports.send(report) => {}
    }
}

async fn collect_records(task: &SessionTask, parent_id: &str) -> Result<Vec<Value>, SessionError> {
    let transport = |message: String| SessionError::StreamTransport {
        parent_id: parent_id.to_string(),
        message,
    };

    let mut stream = task
        .generator
        .generate(task.request.clone())
        .await
        .map_err(|e| transport(e.to_string()))?;
    task.state.send_replace(SessionState::Streaming);
    log_session_streaming(task.id, parent_id);

    let mut records = Vec::new();
    let mut ignored = 0usize;
    while let Some(event) = stream.next().await {
        match event {
            GenerationEvent::Record(record) if records.len() < task.max_records => {
                records.push(record)
            }
            GenerationEvent::Record(_) => ignored += 1,
            GenerationEvent::Complete => {
                if ignored > 0 {
                    log_record_overflow(parent_id, ignored, task.max_records);
                }
                return Ok(records);
            }
            GenerationEvent::Error(message) => return Err(transport(message)),
        }
    }
    Err(transport("stream ended without completion signal".to_string()))
}
