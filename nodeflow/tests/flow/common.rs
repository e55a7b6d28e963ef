//! Shared fixtures for flow integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use nodeflow::{FlowEngine, MockGenerator, Position, RecordingViewport, SequentialIds, SystemClock};
use serde_json::{json, Value};

pub fn task_record(name: &str) -> Value {
    json!({
        "type": "task",
        "data": {"name": name, "description": format!("do {}", name), "difficulty": "medium"}
    })
}

pub fn decision_record() -> Value {
    json!({
        "type": "decision",
        "data": {"question": "Which database?", "options": ["Postgres", "SQLite"]}
    })
}

/// Task record with an unknown field; always rejected.
pub fn invalid_record() -> Value {
    json!({
        "type": "task",
        "data": {"name": "x", "description": "y", "difficulty": "easy", "owner": "z"}
    })
}

/// Engine with sequential child ids, the tokio clock and a recording viewport.
pub fn engine(generator: MockGenerator) -> (FlowEngine, RecordingViewport) {
    let viewport = RecordingViewport::new();
    let engine = FlowEngine::new(Arc::new(generator))
        .with_id_generator(Arc::new(SequentialIds::new()))
        .with_clock(Arc::new(SystemClock::new()))
        .with_viewport(viewport.clone());
    (engine, viewport)
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

pub fn assert_at(actual: Option<Position>, x: f64, y: f64) {
    let p = actual.unwrap_or_else(|| panic!("node has no position, expected ({}, {})", x, y));
    assert!(
        approx(p.x, x) && approx(p.y, y),
        "expected ({}, {}), got ({}, {})",
        x,
        y,
        p.x,
        p.y
    );
}
