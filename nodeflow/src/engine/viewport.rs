//! Rendering-surface hook for viewport requests.

use std::sync::{Arc, Mutex};

use crate::layout::FitViewOptions;
use crate::model::Node;

/// Receives viewport commands from the engine.
pub trait Viewport: Send {
    /// Fit all `nodes` into view.
    fn fit_view(&mut self, options: FitViewOptions, nodes: &[Node]);
}

/// Ignores every request (headless use).
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopViewport;

impl Viewport for NoopViewport {
    fn fit_view(&mut self, _options: FitViewOptions, _nodes: &[Node]) {}
}

/// Records fit requests; clones share the same log.
#[derive(Clone, Debug, Default)]
pub struct RecordingViewport {
    calls: Arc<Mutex<Vec<(FitViewOptions, usize)>>>,
}

impl RecordingViewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded `(options, node count)` pairs.
    pub fn calls(&self) -> Vec<(FitViewOptions, usize)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Viewport for RecordingViewport {
    fn fit_view(&mut self, options: FitViewOptions, nodes: &[Node]) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((options, nodes.len()));
        }
    }
}
