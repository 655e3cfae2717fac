use leakpath_core::{BoundingBox, GridCell, LineSegment, SearchState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSummary {
    pub name: String,
    pub blocks: usize,
    pub bounds: Option<BoundingBox>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorRequest {
    /// 0.0 open, 1.0 closed.
    pub closed_ratio: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRequest {
    pub start: GridCell,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeakReport {
    pub state: String,
    pub status: String,
    pub notice: Option<String>,
    pub segments: Vec<LineSegment>,
    pub ticks_remaining: u32,
}

pub fn state_name(state: SearchState) -> &'static str {
    match state {
        SearchState::Idle => "idle",
        SearchState::Running => "running",
        SearchState::Draw => "draw",
    }
}
