//! FlowEngine end to end: submit, stream, validate, commit, layout, fit view.

use std::time::Duration;

use nodeflow::{
    EdgeChange, GenerationEvent, MockGenerator, Node, NodeChange, NodeData, NodeKind,
    SessionError, SessionState,
};

use crate::common::{assert_at, engine, invalid_record, task_record};

#[tokio::test(start_paused = true)]
async fn prompt_expands_into_laid_out_children() {
    let gen = MockGenerator::with_records(vec![task_record("design"), task_record("build")])
        .with_delay(Duration::from_millis(20));
    let (mut e, viewport) = engine(gen.clone());
    e.seed_root("R", NodeData::empty_prompt()).unwrap();

    e.submit_prompt("R", "Ship a CLI").unwrap();
    let outcomes = e.run_until_idle().await;

    assert_eq!(outcomes.len(), 1);
    let summary = outcomes[0].as_ref().unwrap();
    assert_eq!(summary.node_ids, vec!["R-1", "R-2"]);
    assert_eq!(e.nodes().len(), 3);
    assert_eq!(e.edges().len(), 2);
    assert!(e.edges().iter().all(|edge| edge.source == "R"));
    assert_eq!(e.session_state("R"), SessionState::Committed);
    assert!(e.is_idle());

    assert_at(e.get_node("R").unwrap().position, 0.0, 0.0);
    assert_at(e.get_node("R-1").unwrap().position, -157.5, 300.0);
    assert_at(e.get_node("R-2").unwrap().position, 157.5, 300.0);
    assert_eq!(viewport.calls().len(), 1);

    let request = &gen.requests()[0];
    assert_eq!(request.current_node_id, "R");
    assert_eq!(request.node_tree.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn invalid_record_is_skipped() {
    let gen = MockGenerator::with_records(vec![
        task_record("a"),
        task_record("b"),
        invalid_record(),
        task_record("c"),
    ]);
    let (mut e, _) = engine(gen);
    e.seed_root("R", NodeData::empty_prompt()).unwrap();
    e.submit_prompt("R", "go").unwrap();

    let outcomes = e.run_until_idle().await;
    let summary = outcomes[0].as_ref().unwrap();
    assert_eq!(summary.node_ids.len(), 3);
    assert_eq!(summary.rejected.len(), 1);
    assert_eq!(e.graph().children("R").len(), 3);
}

#[tokio::test(start_paused = true)]
async fn cancelled_expansion_leaves_graph_alone() {
    let gen = MockGenerator::new(vec![GenerationEvent::Record(task_record("a"))]).hanging();
    let (mut e, _) = engine(gen);
    e.seed_root("R", NodeData::empty_prompt()).unwrap();
    e.submit_prompt("R", "go").unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(e.cancel_expansion("R"));
    assert!(e.run_until_idle().await.is_empty());
    assert_eq!(e.nodes().len(), 1);
    assert_eq!(e.session_state("R"), SessionState::Idle);
}

#[tokio::test(start_paused = true)]
async fn removing_the_parent_mid_stream_discards_results() {
    let gen = MockGenerator::with_records(vec![task_record("late")])
        .with_delay(Duration::from_millis(50));
    let (mut e, _) = engine(gen);
    e.seed_root("R", NodeData::empty_prompt()).unwrap();
    let p = e.add_prompt_node("R").unwrap();
    e.submit_prompt(&p, "nested").unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    e.on_edges_change(vec![EdgeChange::Remove {
        id: format!("R-{}", p),
    }])
    .unwrap();
    e.on_nodes_change(vec![NodeChange::Remove { id: p.clone() }])
        .unwrap();
    assert_eq!(e.session_state(&p), SessionState::Idle);

    assert!(e.run_until_idle().await.is_empty());
    assert_eq!(e.nodes().len(), 1);
    assert!(e.edges().is_empty());
}

#[tokio::test(start_paused = true)]
async fn replacing_the_parent_under_the_same_id_discards_results() {
    let gen = MockGenerator::with_records(vec![task_record("stale")])
        .with_delay(Duration::from_millis(50));
    let (mut e, _) = engine(gen);
    e.seed_root("R", NodeData::empty_prompt()).unwrap();
    e.submit_prompt("R", "old question").unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    e.on_nodes_change(vec![
        NodeChange::Remove { id: "R".into() },
        NodeChange::Add {
            node: Node::root("R", NodeData::empty_prompt()),
        },
    ])
    .unwrap();
    assert_eq!(e.session_state("R"), SessionState::Idle);

    assert!(e.run_until_idle().await.is_empty());
    assert_eq!(e.nodes().len(), 1);
    assert!(e.edges().is_empty());
    assert_eq!(e.get_node("R").unwrap().data.title(), "");
}

#[tokio::test(start_paused = true)]
async fn generator_errors_surface_as_failed_sessions() {
    let gen = MockGenerator::new(vec![
        GenerationEvent::Record(task_record("a")),
        GenerationEvent::Error("upstream closed".into()),
    ]);
    let (mut e, _) = engine(gen);
    e.seed_root("R", NodeData::empty_prompt()).unwrap();
    e.submit_prompt("R", "go").unwrap();

    let outcomes = e.run_until_idle().await;
    match &outcomes[0] {
        Err(SessionError::StreamTransport { message, .. }) => {
            assert!(message.contains("upstream closed"))
        }
        other => panic!("expected StreamTransport, got {:?}", other),
    }
    assert_eq!(e.session_state("R"), SessionState::Failed);
    assert_eq!(e.nodes().len(), 1);

    // a failed node can be expanded again
    e.submit_prompt("R", "again").unwrap();
    assert!(e.session_state("R").is_active());
}

#[tokio::test(start_paused = true)]
async fn error_records_become_diagnostic_nodes() {
    let gen = MockGenerator::with_records(vec![
        serde_json::json!({"type": "error", "data": {"message": "rate limited"}}),
    ]);
    let (mut e, _) = engine(gen);
    e.seed_root("R", NodeData::empty_prompt()).unwrap();
    e.submit_prompt("R", "go").unwrap();

    let outcomes = e.run_until_idle().await;
    let summary = outcomes[0].as_ref().unwrap();
    assert_eq!(summary.diagnostics, 1);
    let child = e.get_node(&summary.node_ids[0]).unwrap();
    assert_eq!(child.kind(), NodeKind::Error);
    assert_eq!(child.data.title(), "rate limited");
}
