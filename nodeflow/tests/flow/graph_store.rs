//! GraphStore: forest invariant and atomic batches through the public API.

use std::sync::Arc;

use nodeflow::{
    Connection, EdgeChange, GraphError, GraphStore, Node, NodeChange, NodeData, SequentialIds,
};

fn store() -> GraphStore {
    GraphStore::with_id_generator(Arc::new(SequentialIds::new()))
}

#[test]
fn child_ids_extend_parent_id() {
    let mut g = store();
    g.add_root_node("R", NodeData::empty_prompt()).unwrap();
    let a = g.add_child_node("R", NodeData::empty_prompt()).unwrap();
    let b = g.add_child_node(&a, NodeData::empty_prompt()).unwrap();
    assert_eq!(a, "R-1");
    assert_eq!(b, "R-1-2");
    assert_eq!(g.parent_of(&b), Some("R-1"));
    assert_eq!(g.edges().len(), 2);
    assert_eq!(g.edges()[1].id, "R-1-R-1-2");
}

#[test]
fn connect_rejects_second_parent_and_cycles() {
    let mut g = store();
    g.add_root_node("A", NodeData::empty_prompt()).unwrap();
    g.add_root_node("B", NodeData::empty_prompt()).unwrap();
    let child = g.add_child_node("A", NodeData::empty_prompt()).unwrap();

    match g.connect(Connection::new("B", child.clone())) {
        Err(GraphError::MultipleParents {
            existing_parent, ..
        }) => assert_eq!(existing_parent, "A"),
        other => panic!("expected MultipleParents, got {:?}", other),
    }
    assert!(matches!(
        g.connect(Connection::new(child.clone(), "A")),
        Err(GraphError::Cycle { .. })
    ));

    let revision = g.revision();
    let edge = g.connect(Connection::new("A", "B")).unwrap();
    assert_eq!(edge.id, "A-B");
    assert_eq!(g.parent_of("B"), Some("A"));
    assert!(g.revision() > revision);
}

#[test]
fn failed_batch_leaves_graph_untouched() {
    let mut g = store();
    g.add_root_node("R", NodeData::empty_prompt()).unwrap();
    let before_nodes = g.nodes().to_vec();
    let before_revision = g.revision();

    let result = g.apply_node_changes(vec![
        NodeChange::Add {
            node: Node::root("X", NodeData::empty_prompt()),
        },
        NodeChange::Add {
            node: Node::root("R", NodeData::empty_prompt()),
        },
    ]);
    assert_eq!(result, Err(GraphError::DuplicateNodeId("R".into())));
    assert_eq!(g.nodes(), &before_nodes[..]);
    assert_eq!(g.revision(), before_revision);
}

#[test]
fn removing_referenced_node_needs_edge_removal_first() {
    let mut g = store();
    g.add_root_node("R", NodeData::empty_prompt()).unwrap();
    let child = g.add_child_node("R", NodeData::empty_prompt()).unwrap();

    let remove = || vec![NodeChange::Remove { id: child.clone() }];
    assert!(matches!(
        g.apply_node_changes(remove()),
        Err(GraphError::DanglingEdge { .. })
    ));

    g.apply_edge_changes(vec![EdgeChange::Remove {
        id: format!("R-{}", child),
    }])
    .unwrap();
    assert_eq!(g.parent_of(&child), None);
    g.apply_node_changes(remove()).unwrap();
    assert_eq!(g.node_count(), 1);
}

/// **Scenario**: A long mixed run of `add_child_node` (deep chains, wide fans and jumps back
/// to earlier nodes) keeps the forest intact after every step: no dangling edge, one parent
/// per node, `parent_id` matches the edge, and edges = nodes - roots.
#[test]
fn add_child_node_sequences_keep_forest_invariant() {
    use std::collections::HashSet;

    let mut g = store();
    g.add_root_node("R", NodeData::empty_prompt()).unwrap();
    g.add_root_node("S", NodeData::empty_prompt()).unwrap();
    let mut ids: Vec<String> = vec!["R".into(), "S".into()];

    for step in 0..120usize {
        let parent = match step % 4 {
            // deep: extend the newest node
            0 => ids[ids.len() - 1].clone(),
            // wide: fan out under a root
            1 => ids[step % 2].clone(),
            // jump to an earlier node
            2 => ids[(step * 7) % ids.len()].clone(),
            _ => ids[ids.len() / 2].clone(),
        };
        let child = g.add_child_node(&parent, NodeData::empty_prompt()).unwrap();
        assert!(child.starts_with(&format!("{}-", parent)));
        ids.push(child);

        let node_ids: HashSet<&str> = g.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(node_ids.len(), g.node_count());
        let mut targets = HashSet::new();
        for edge in g.edges() {
            assert!(node_ids.contains(edge.source.as_str()), "dangling {}", edge.id);
            assert!(node_ids.contains(edge.target.as_str()), "dangling {}", edge.id);
            assert!(targets.insert(edge.target.as_str()), "two parents for {}", edge.target);
        }
        for node in g.nodes() {
            assert_eq!(node.parent_id.as_deref(), g.parent_of(&node.id));
        }
        assert_eq!(g.edges().len(), g.node_count() - 2);
    }
    assert_eq!(g.node_count(), 122);
}
