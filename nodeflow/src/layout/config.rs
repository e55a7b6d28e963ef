//! Layout and animation parameters.

use std::time::Duration;

/// Viewport fit request issued after the first completed layout animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitViewOptions {
    pub duration_ms: u64,
    /// Fraction of the viewport kept free around the nodes.
    pub padding: f64,
}

impl Default for FitViewOptions {
    fn default() -> Self {
        Self {
            duration_ms: 200,
            padding: 0.2,
        }
    }
}

/// Tidy-tree spacing and animation timing.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Horizontal footprint of one node; sibling distance is `separation * node_width`.
    pub node_width: f64,
    /// Vertical step between depth levels.
    pub node_height: f64,
    pub separation: f64,
    /// Length of one layout animation.
    pub duration_ms: f64,
    /// Period of the animation ticker.
    pub tick_interval: Duration,
    pub fit_view: FitViewOptions,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 300.0,
            node_height: 300.0,
            separation: 1.05,
            duration_ms: 300.0,
            tick_interval: Duration::from_millis(16),
            fit_view: FitViewOptions::default(),
        }
    }
}
