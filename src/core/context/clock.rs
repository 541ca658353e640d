//=========================================================================
// Frame Clock
//=========================================================================

use std::time::{Duration, Instant};

/// Measures wall-clock time between consecutive ticks.
///
/// One clock per context, so an incoming context starts its own timeline
/// instead of inheriting the outgoing one's.
#[derive(Debug, Clone)]
pub(crate) struct FrameClock {
    last: Instant,
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            frame_index: 0,
        }
    }

    /// Restarts the baseline, so time spent before activation (background
    /// loading, setup) is not reported as the first frame's delta.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Elapsed time since the previous tick (or reset).
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now.saturating_duration_since(self.last);
        self.last = now;
        self.frame_index = self.frame_index.wrapping_add(1);
        delta
    }

    /// Ticks taken so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}
