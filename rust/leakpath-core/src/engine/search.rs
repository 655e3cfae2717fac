use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::grid::CubeGrid;
use crate::models::{Direction, GridCell, LineSegment};

use super::breadcrumbs::{Breadcrumbs, NodeId, PathNode};
use super::frontier::PriorityFrontier;
use super::heuristics::distance_to_box;

/// "Already tried leaving `cell` towards `direction`". Airtightness is
/// directional, so the dedup key is the move, not the cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MoveKey {
    pub cell: GridCell,
    pub direction: Direction,
}

impl MoveKey {
    pub fn new(cell: GridCell, direction: Direction) -> Self { Self { cell, direction } }
}

pub type VisitedSet = FxHashSet<MoveKey>;

/// Shared cancellation flag. Only ever goes from false to true.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self { Self::default() }
    pub fn cancel(&self) { self.0.store(true, Ordering::Release); }
    pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::Acquire) }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchResult {
    /// Frontier exhausted without reaching outside the grid.
    NoLeak,
    /// Cancelled by the caller, or the grid went away mid-search.
    Cancelled,
    /// Path from the start cell to open space, innermost segment first.
    Found(Vec<LineSegment>),
}

impl SearchResult {
    pub fn segments(&self) -> Option<&[LineSegment]> {
        match self {
            SearchResult::Found(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes popped from the frontier.
    pub expanded: u64,
    /// Distinct moves recorded in the visited set.
    pub moves: u64,
    /// Nodes pushed onto the frontier, start node included.
    pub queued: u64,
}

/// Best-first leak search. Owns its scratch buffers and reuses them between
/// runs; they are empty whenever [`LeakSearch::find_leak_path`] returns.
#[derive(Debug, Default)]
pub struct LeakSearch {
    crumbs: Breadcrumbs,
    frontier: PriorityFrontier,
    visited: VisitedSet,
    stats: SearchStats,
}

impl LeakSearch {
    pub fn new() -> Self { Self::default() }

    /// Find a route from `start` to just outside the grid's bounding box
    /// through faces that are not sealed.
    pub fn find_leak_path<G: CubeGrid + ?Sized>(&mut self, grid: &G, start: GridCell, cancel: &CancelToken) -> SearchResult {
        self.clear();
        self.stats = SearchStats::default();
        let result = self.run(grid, start, cancel);
        debug!(
            start = %start,
            expanded = self.stats.expanded,
            moves = self.stats.moves,
            queued = self.stats.queued,
            outcome = outcome_name(&result),
            "leak search finished"
        );
        self.clear();
        result
    }

    fn run<G: CubeGrid + ?Sized>(&mut self, grid: &G, start: GridCell, cancel: &CancelToken) -> SearchResult {
        if !grid.is_live() {
            return SearchResult::NoLeak;
        }
        let Some(bounds) = grid.bounds() else { return SearchResult::NoLeak };
        if !bounds.contains(start) {
            return SearchResult::NoLeak;
        }
        if !bounds.is_within_limit() {
            warn!(min = %bounds.min, max = %bounds.max, "grid extents out of range, not searching");
            return SearchResult::NoLeak;
        }
        let exit_box = bounds.inflate(1);

        let start_id = self.crumbs.push(PathNode::new(start, 0, distance_to_box(start, &bounds), None));
        self.frontier.insert(&mut self.crumbs, start_id);
        self.stats.queued += 1;

        while let Some(current_id) = self.frontier.pop(&mut self.crumbs) {
            self.stats.expanded += 1;
            let current = self.crumbs[current_id];

            // negative: on the shell around the hull, i.e. already out
            if distance_to_box(current.position, &bounds) < 0 {
                return SearchResult::Found(self.crumbs.segments_to(current_id));
            }

            for direction in Direction::ALL {
                if cancel.is_cancelled() || !grid.is_live() {
                    return SearchResult::Cancelled;
                }
                if !self.visited.insert(MoveKey::new(current.position, direction)) {
                    continue;
                }
                self.stats.moves += 1;

                let target = current.position + direction;
                let to_outside = distance_to_box(target, &bounds) + 1;
                if to_outside < 0 {
                    return SearchResult::Found(self.crumbs.segments_to(current_id));
                }
                if exit_box.contains(target) && !grid.is_face_sealed(current.position, direction) {
                    self.enqueue(current_id, &current, target, to_outside);
                }
            }
        }
        SearchResult::NoLeak
    }

    fn enqueue(&mut self, from: NodeId, current: &PathNode, target: GridCell, to_outside: i32) {
        let path_cost = current.path_cost + 1;
        let id = self.crumbs.push(PathNode::new(target, path_cost, path_cost + to_outside, Some(from)));
        self.frontier.insert(&mut self.crumbs, id);
        self.stats.queued += 1;
    }

    fn clear(&mut self) {
        self.frontier.clear();
        self.crumbs.clear();
        self.visited.clear();
    }

    /// Counters from the last run.
    pub fn stats(&self) -> SearchStats { self.stats }

    /// True when no scratch state is held (between runs).
    pub fn is_clear(&self) -> bool {
        self.frontier.is_empty() && self.crumbs.is_empty() && self.visited.is_empty()
    }
}

fn outcome_name(r: &SearchResult) -> &'static str {
    match r {
        SearchResult::NoLeak => "no_leak",
        SearchResult::Cancelled => "cancelled",
        SearchResult::Found(_) => "found",
    }
}
