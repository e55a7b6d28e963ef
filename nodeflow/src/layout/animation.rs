//! Linear interpolation of node positions between two layout passes.

use crate::model::Position;

/// Where one node animates from and to.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub id: String,
    pub from: Position,
    pub to: Position,
}

/// Positions for one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub positions: Vec<(String, Position)>,
    /// Set once elapsed time passed the duration; positions are then exactly the targets.
    pub finished: bool,
}

/// One running interpolation; replaced wholesale by the next layout pass.
#[derive(Clone, Debug)]
pub struct LayoutAnimation {
    transitions: Vec<Transition>,
    started_at: f64,
    duration_ms: f64,
}

impl LayoutAnimation {
    pub fn new(transitions: Vec<Transition>, started_at: f64, duration_ms: f64) -> Self {
        Self {
            transitions,
            started_at,
            duration_ms,
        }
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn sample(&self, now_ms: f64) -> Frame {
        let elapsed = (now_ms - self.started_at).max(0.0);
        if elapsed > self.duration_ms {
            return Frame {
                positions: self
                    .transitions
                    .iter()
                    .map(|t| (t.id.clone(), t.to))
                    .collect(),
                finished: true,
            };
        }
        let s = if self.duration_ms > 0.0 {
            elapsed / self.duration_ms
        } else {
            1.0
        };
        Frame {
            positions: self
                .transitions
                .iter()
                .map(|t| (t.id.clone(), t.from.lerp(t.to, s)))
                .collect(),
            finished: false,
        }
    }
}
