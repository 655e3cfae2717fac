use serde::{Deserialize, Serialize};

pub const DEFAULT_DRAW_TICKS_PER_SEGMENT: u32 = 10;
pub const DEFAULT_MAX_DRAW_TICKS: u32 = 3_600; // one minute at 60 ticks/s
pub const DEFAULT_SEAL_CHECK_INTERVAL_TICKS: u32 = 60;

/// Tuning for [`crate::lifecycle::LeakSearchService`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeakOptions {
    /// Draw time granted per path segment.
    pub draw_ticks_per_segment: u32,
    /// Upper bound on the draw time of one path.
    pub max_draw_ticks: u32,
    /// How often a drawn path is re-checked against the grid.
    pub seal_check_interval_ticks: u32,
}

impl Default for LeakOptions {
    fn default() -> Self {
        Self {
            draw_ticks_per_segment: DEFAULT_DRAW_TICKS_PER_SEGMENT,
            max_draw_ticks: DEFAULT_MAX_DRAW_TICKS,
            seal_check_interval_ticks: DEFAULT_SEAL_CHECK_INTERVAL_TICKS,
        }
    }
}

impl LeakOptions {
    /// Draw budget for a path of `segments` hops.
    pub fn draw_ticks_for(&self, segments: usize) -> u32 {
        let wanted = (segments as u64).saturating_mul(self.draw_ticks_per_segment as u64);
        wanted.min(self.max_draw_ticks as u64) as u32
    }
}
