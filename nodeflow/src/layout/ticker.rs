//! Recurring animation timer.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Owns at most one tokio interval. Starting replaces the previous interval and stopping
/// drops it, so no timer outlives the animation it drives.
#[derive(Debug)]
pub struct AnimationTicker {
    period: Duration,
    interval: Option<Interval>,
}

impl AnimationTicker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    /// Must be called inside a tokio runtime.
    pub fn start(&mut self) {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.interval = Some(interval);
    }

    pub fn stop(&mut self) {
        self.interval = None;
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Next tick. Pends forever while stopped, so it can sit in a `select!` unconditionally.
    pub async fn tick(&mut self) -> Instant {
        match self.interval.as_mut() {
            Some(interval) => interval.tick().await,
            None => std::future::pending().await,
        }
    }
}
