use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use leakpath_core::{CancelToken, GridCell, LeakSearch, LineSegment, SearchResult, ShipGrid};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub grid: String,
    pub start: GridCell,
    /// `leak`, `no_leak` or `cancelled`.
    pub outcome: &'static str,
    pub segments: Vec<LineSegment>,
    pub expanded: u64,
    pub moves: u64,
    pub queued: u64,
}

pub fn load_grid(path: &Path) -> Result<ShipGrid> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {:?}", path))?;
    ShipGrid::from_json(&bytes).with_context(|| format!("invalid grid in {:?}", path))
}

/// Runs one search on the calling thread.
pub fn probe(grid: &ShipGrid, start: GridCell) -> ProbeReport {
    let mut engine = LeakSearch::new();
    let result = engine.find_leak_path(grid, start, &CancelToken::new());
    let stats = engine.stats();
    let (outcome, segments) = match result {
        SearchResult::Found(segments) => ("leak", segments),
        SearchResult::NoLeak => ("no_leak", Vec::new()),
        SearchResult::Cancelled => ("cancelled", Vec::new()),
    };
    info!(grid = grid.name(), start = %start, outcome, segments = segments.len(), "probe done");
    ProbeReport {
        grid: grid.name().to_string(),
        start,
        outcome,
        segments,
        expanded: stats.expanded,
        moves: stats.moves,
        queued: stats.queued,
    }
}

pub fn render_text(report: &ProbeReport) -> String {
    let mut out = String::new();
    match report.outcome {
        "leak" => {
            let _ = writeln!(out, "leak from {} in {} steps", report.start, report.segments.len());
            for s in &report.segments {
                let _ = writeln!(out, "  {} -> {}", s.start, s.end);
            }
        }
        "no_leak" => out.push_str("No leaks!\n"),
        _ => out.push_str("Cancelled.\n"),
    }
    let _ = writeln!(out, "expanded={} moves={} queued={}", report.expanded, report.moves, report.queued);
    out
}
