//! ExpansionManager: per-parent sessions, partial acceptance, cancellation.

use std::sync::Arc;
use std::time::Duration;

use nodeflow::{
    ChatMessage, ExpansionManager, GenerationEvent, GraphStore, MockGenerator, NodeData,
    NodeKind, SequentialIds, SessionError, SessionState,
};

use crate::common::{decision_record, invalid_record, task_record};

fn graph_with_root() -> GraphStore {
    let mut g = GraphStore::with_id_generator(Arc::new(SequentialIds::new()));
    g.add_root_node("R", NodeData::empty_prompt()).unwrap();
    g
}

#[tokio::test]
async fn invalid_records_are_dropped_and_the_rest_commit() {
    let gen = MockGenerator::with_records(vec![
        task_record("a"),
        invalid_record(),
        task_record("b"),
        decision_record(),
    ]);
    let mut manager = ExpansionManager::new(Arc::new(gen));
    let mut graph = graph_with_root();

    manager
        .submit(&graph, "R", vec![ChatMessage::user("go")])
        .unwrap();
    let report = manager.next_report().await.expect("report");
    let summary = manager.commit(&mut graph, report).unwrap();

    assert_eq!(summary.node_ids, vec!["R-1", "R-2", "R-3"]);
    assert_eq!(summary.rejected.len(), 1);
    assert_eq!(summary.rejected[0].index, 1);
    let kinds: Vec<NodeKind> = graph.children("R").iter().map(|n| n.kind()).collect();
    assert_eq!(kinds, vec![NodeKind::Task, NodeKind::Task, NodeKind::Decision]);
    assert_eq!(manager.state("R"), SessionState::Committed);
}

#[tokio::test]
async fn sessions_on_different_parents_run_side_by_side() {
    let gen = MockGenerator::with_records(vec![task_record("x")])
        .with_delay(Duration::from_millis(5));
    let mut manager = ExpansionManager::new(Arc::new(gen));
    let mut graph = graph_with_root();
    graph.add_root_node("S", NodeData::empty_prompt()).unwrap();

    manager.submit(&graph, "R", vec![ChatMessage::user("r")]).unwrap();
    manager.submit(&graph, "S", vec![ChatMessage::user("s")]).unwrap();
    assert!(matches!(
        manager.submit(&graph, "R", vec![ChatMessage::user("again")]),
        Err(SessionError::Busy { .. })
    ));

    let mut parents = Vec::new();
    while let Some(report) = manager.next_report().await {
        parents.push(manager.commit(&mut graph, report).unwrap().parent_id);
    }
    parents.sort();
    assert_eq!(parents, vec!["R", "S"]);
    assert_eq!(graph.children("R").len(), 1);
    assert_eq!(graph.children("S").len(), 1);
}

#[tokio::test]
async fn cancel_mid_stream_commits_nothing() {
    let gen = MockGenerator::new(vec![GenerationEvent::Record(task_record("a"))]).hanging();
    let mut manager = ExpansionManager::new(Arc::new(gen));
    let graph = graph_with_root();

    manager.submit(&graph, "R", vec![ChatMessage::user("go")]).unwrap();
    let mut state = manager.subscribe("R").expect("subscription");
    state
        .wait_for(|s| *s == SessionState::Streaming)
        .await
        .unwrap();

    assert!(manager.cancel("R"));
    assert!(!manager.cancel("R"));
    assert_eq!(manager.state("R"), SessionState::Idle);
    assert!(manager.next_report().await.is_none());
    assert_eq!(graph.node_count(), 1);
}

#[tokio::test]
async fn resubmit_after_failure_is_allowed() {
    let gen = MockGenerator::with_records(vec![invalid_record()]);
    let mut manager = ExpansionManager::new(Arc::new(gen));
    let mut graph = graph_with_root();

    manager.submit(&graph, "R", vec![ChatMessage::user("go")]).unwrap();
    let report = manager.next_report().await.unwrap();
    let err = manager.commit(&mut graph, report).unwrap_err();
    assert!(matches!(err, SessionError::NoAcceptedRecords { .. }));
    assert!(err.is_retryable());
    assert_eq!(manager.state("R"), SessionState::Failed);

    manager.submit(&graph, "R", vec![ChatMessage::user("retry")]).unwrap();
    assert!(manager.state("R").is_active());
}
