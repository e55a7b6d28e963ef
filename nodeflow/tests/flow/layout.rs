//! LayoutEngine: tidy-tree properties and animation through the public API.

use std::sync::Arc;

use nodeflow::{
    layout_forest, GraphStore, LayoutConfig, LayoutEngine, NodeData, Position, SequentialIds,
    TickOutcome,
};

use crate::common::{approx, assert_at};

/// R -> (A -> (A1, A2, A3), B, C -> C1)
fn uneven_tree() -> GraphStore {
    let mut g = GraphStore::with_id_generator(Arc::new(SequentialIds::new()));
    g.add_root_node("R", NodeData::empty_prompt()).unwrap();
    let a = g.add_child_node("R", NodeData::empty_prompt()).unwrap();
    g.add_child_node("R", NodeData::empty_prompt()).unwrap();
    let c = g.add_child_node("R", NodeData::empty_prompt()).unwrap();
    for _ in 0..3 {
        g.add_child_node(&a, NodeData::empty_prompt()).unwrap();
    }
    g.add_child_node(&c, NodeData::empty_prompt()).unwrap();
    g
}

fn depth(g: &GraphStore, id: &str) -> usize {
    let mut d = 0;
    let mut cur = id;
    while let Some(p) = g.parent_of(cur) {
        d += 1;
        cur = p;
    }
    d
}

#[test]
fn tidy_tree_properties_hold() {
    let g = uneven_tree();
    let config = LayoutConfig::default();
    let layout = layout_forest(g.nodes(), g.edges(), &config).unwrap();
    assert_eq!(layout.positions.len(), g.node_count());
    assert_eq!(layout.roots, 1);

    let pos = |id: &str| -> Position {
        layout
            .positions
            .iter()
            .find(|(n, _)| n == id)
            .map(|(_, p)| *p)
            .unwrap()
    };
    assert_at(Some(pos("R")), 0.0, 0.0);

    let min_gap = config.node_width * config.separation;
    for level in 0..=2 {
        let mut xs: Vec<f64> = g
            .nodes()
            .iter()
            .filter(|n| depth(&g, &n.id) == level)
            .map(|n| {
                let p = pos(&n.id);
                assert!(approx(p.y, level as f64 * config.node_height));
                p.x
            })
            .collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for pair in xs.windows(2) {
            assert!(pair[1] - pair[0] >= min_gap - 1e-6, "overlap at depth {}: {:?}", level, xs);
        }
    }

    for parent in g.nodes() {
        let children = g.children(&parent.id);
        if let (Some(first), Some(last)) = (children.first(), children.last()) {
            let mid = (pos(&first.id).x + pos(&last.id).x) / 2.0;
            assert!(approx(pos(&parent.id).x, mid), "{} not centred", parent.id);
        }
    }
}

#[test]
fn animation_reaches_targets_and_fits_once() {
    let mut g = uneven_tree();
    let mut engine = LayoutEngine::new(LayoutConfig::default());
    let target = engine.compute(&g).unwrap();

    assert!(engine.relayout_if_needed(&g, 1000.0).unwrap());
    assert!(!engine.relayout_if_needed(&g, 1000.0).unwrap());
    assert_eq!(engine.tick(&mut g, 1100.0), TickOutcome::Running);
    match engine.tick(&mut g, 1301.0) {
        TickOutcome::Finished { fit_view } => assert!(fit_view.is_some()),
        other => panic!("expected Finished, got {:?}", other),
    }
    for (id, p) in &target.positions {
        assert_at(g.get_node(id).unwrap().position, p.x, p.y);
    }

    // same structure again: positions stay put and no second fit
    engine.relayout(&g, 2000.0).unwrap();
    assert_eq!(
        engine.tick(&mut g, 2400.0),
        TickOutcome::Finished { fit_view: None }
    );
    for (id, p) in &target.positions {
        assert_at(g.get_node(id).unwrap().position, p.x, p.y);
    }
    assert_eq!(engine.tick(&mut g, 2500.0), TickOutcome::Idle);
}
