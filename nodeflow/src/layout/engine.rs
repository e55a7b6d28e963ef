//! Layout engine: re-layout on node-count changes and drive the position animation.
//!
//! A pass computes target positions for the whole forest and starts one animation from
//! each node's current position (or its target, for nodes never placed). Starting a pass
//! replaces any animation in flight. [`LayoutEngine::tick`] writes interpolated positions
//! into the graph; only `position` is touched, so selection and drag flags survive.

use crate::logging::{log_layout_error, log_layout_pass};
use crate::store::GraphStore;

use super::animation::{LayoutAnimation, Transition};
use super::config::{FitViewOptions, LayoutConfig};
use super::error::LayoutError;
use super::tree::{layout_forest, TreeLayout};

/// Result of one animation tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// No animation running.
    Idle,
    Running,
    /// Animation reached its targets. `fit_view` is set only for the first one ever.
    Finished { fit_view: Option<FitViewOptions> },
}

#[derive(Debug, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
    animation: Option<LayoutAnimation>,
    /// Node count seen by the last successful pass.
    laid_out_count: Option<usize>,
    fitted: bool,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Target positions for the current forest, without touching the graph.
    pub fn compute(&self, graph: &GraphStore) -> Result<TreeLayout, LayoutError> {
        layout_forest(graph.nodes(), graph.edges(), &self.config)
    }

    /// True when the node count changed since the last pass.
    pub fn needs_layout(&self, graph: &GraphStore) -> bool {
        self.laid_out_count != Some(graph.node_count())
    }

    /// Runs a layout pass and (re)starts the animation at `now_ms`.
    ///
    /// On error the previous animation keeps running and positions are left as they are.
    pub fn relayout(&mut self, graph: &GraphStore, now_ms: f64) -> Result<(), LayoutError> {
        let layout = self.compute(graph).map_err(|e| {
            log_layout_error(&e);
            e
        })?;
        log_layout_pass(layout.positions.len(), layout.roots);

        let transitions: Vec<Transition> = layout
            .positions
            .into_iter()
            .map(|(id, to)| {
                let from = graph.get_node(&id).and_then(|n| n.position).unwrap_or(to);
                Transition { id, from, to }
            })
            .collect();
        self.laid_out_count = Some(graph.node_count());
        self.animation = if transitions.is_empty() {
            None
        } else {
            Some(LayoutAnimation::new(
                transitions,
                now_ms,
                self.config.duration_ms,
            ))
        };
        Ok(())
    }

    /// Runs a pass only when the node count changed; returns whether one ran.
    pub fn relayout_if_needed(
        &mut self,
        graph: &GraphStore,
        now_ms: f64,
    ) -> Result<bool, LayoutError> {
        if !self.needs_layout(graph) {
            return Ok(false);
        }
        self.relayout(graph, now_ms)?;
        Ok(true)
    }

    /// Writes the positions for `now_ms` into `graph`.
    pub fn tick(&mut self, graph: &mut GraphStore, now_ms: f64) -> TickOutcome {
        let Some(animation) = &self.animation else {
            return TickOutcome::Idle;
        };
        let frame = animation.sample(now_ms);
        for (id, position) in &frame.positions {
            graph.set_position(id, *position);
        }
        if !frame.finished {
            return TickOutcome::Running;
        }
        self.animation = None;
        let fit_view = if self.fitted {
            None
        } else {
            self.fitted = true;
            Some(self.config.fit_view)
        };
        TickOutcome::Finished { fit_view }
    }

    /// Drops the running animation; nodes stay where the last tick put them.
    pub fn stop(&mut self) {
        self.animation = None;
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn animation(&self) -> Option<&LayoutAnimation> {
        self.animation.as_ref()
    }
}
