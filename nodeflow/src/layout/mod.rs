//! Layout engine: tidy-tree placement plus animated transitions between passes.

mod animation;
mod clock;
mod config;
mod engine;
mod error;
mod ticker;
mod tree;

pub use animation::{Frame, LayoutAnimation, Transition};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{FitViewOptions, LayoutConfig};
pub use engine::{LayoutEngine, TickOutcome};
pub use error::LayoutError;
pub use ticker::AnimationTicker;
pub use tree::{layout_forest, TreeLayout};
