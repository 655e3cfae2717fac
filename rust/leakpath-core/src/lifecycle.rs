//! Background execution of [`LeakSearch`] for a tick-driven owner.
//!
//! At most one search is in flight. The worker thread owns the engine while
//! it runs and hands it back through its `JoinHandle`, so scratch buffers
//! are reused across searches without any locking. The only state shared
//! with the worker is the [`CancelToken`] and the one-shot result channel.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, TryRecvError};
use tracing::{debug, error, info, warn};

use crate::engine::{CancelToken, LeakSearch, SearchResult, SearchStats};
use crate::grid::CubeGrid;
use crate::models::{GridCell, LineSegment};
use crate::options::LeakOptions;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Running,
    /// A leak path is being shown; see [`LeakSearchService::trail`].
    Draw,
}

/// Three-state summary for status panels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeakStatus {
    Ready,
    Computing,
    LeakFound,
}

impl fmt::Display for LeakStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LeakStatus::Ready => "Ready",
            LeakStatus::Computing => "Computing",
            LeakStatus::LeakFound => "Leak found",
        })
    }
}

/// Outcome of the last search that did not produce a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    NoLeaks,
    Cancelled,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Notice::NoLeaks => "No leaks!",
            Notice::Cancelled => "Cancelled.",
        })
    }
}

/// A found leak path and how much longer it stays visible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeakTrail {
    pub segments: Vec<LineSegment>,
    pub ticks_remaining: u32,
}

impl LeakTrail {
    /// True when any hop of the path now crosses a sealed face.
    pub fn is_resealed<G: CubeGrid + ?Sized>(&self, grid: &G) -> bool {
        self.segments
            .iter()
            .any(|s| s.direction().map_or(true, |d| grid.is_face_sealed(s.start, d)))
    }
}

struct SearchTask {
    start: GridCell,
    cancel: CancelToken,
    results: Receiver<SearchResult>,
    handle: JoinHandle<LeakSearch>,
}

/// Owns the single in-flight leak search and the path it produced.
pub struct LeakSearchService {
    options: LeakOptions,
    engine: Option<LeakSearch>,
    task: Option<SearchTask>,
    trail: Option<LeakTrail>,
    notice: Option<Notice>,
    ticks: u64,
}

impl Default for LeakSearchService {
    fn default() -> Self { Self::new(LeakOptions::default()) }
}

impl fmt::Debug for LeakSearchService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeakSearchService")
            .field("state", &self.state())
            .field("notice", &self.notice)
            .field("segments", &self.trail.as_ref().map(|t| t.segments.len()))
            .finish()
    }
}

impl LeakSearchService {
    pub fn new(options: LeakOptions) -> Self {
        Self { options, engine: Some(LeakSearch::new()), task: None, trail: None, notice: None, ticks: 0 }
    }

    /// Starts a search from `start`. Any search already running is
    /// cancelled and joined first, and any shown path is dropped.
    ///
    /// A start outside the grid, or a grid that is empty or closed, yields
    /// `NoLeaks` right away without spawning a worker.
    pub fn start<G>(&mut self, grid: Arc<G>, start: GridCell) -> SearchState
    where
        G: CubeGrid + Send + Sync + 'static,
    {
        self.abort();
        self.trail = None;
        self.notice = None;

        let valid = grid.is_live() && grid.bounds().map_or(false, |b| b.contains(start));
        if !valid {
            debug!(start = %start, "leak search start rejected");
            self.notice = Some(Notice::NoLeaks);
            return SearchState::Idle;
        }

        let mut engine = self.engine.take().unwrap_or_default();
        let cancel = CancelToken::new();
        let token = cancel.clone();
        let (tx, results) = crossbeam_channel::bounded(1);
        let spawned = thread::Builder::new().name("leak-search".into()).spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| engine.find_leak_path(&*grid, start, &token)));
            let result = match outcome {
                Ok(result) => result,
                Err(payload) => {
                    error!(start = %start, panic = panic_message(payload.as_ref()), "leak search panicked");
                    engine = LeakSearch::new();
                    SearchResult::Cancelled
                }
            };
            // receiver may already be gone if the owner was dropped
            let _ = tx.send(result);
            engine
        });

        match spawned {
            Ok(handle) => {
                info!(start = %start, "leak search started");
                self.task = Some(SearchTask { start, cancel, results, handle });
                SearchState::Running
            }
            Err(e) => {
                error!(error = %e, "failed to spawn leak search thread");
                self.notice = Some(Notice::Cancelled);
                SearchState::Idle
            }
        }
    }

    /// Cancels any running search, waits for the worker to stop, and drops
    /// the shown path. Returns once the search scratch state is released.
    pub fn cancel_and_clear(&mut self) {
        if self.abort() {
            self.notice = Some(Notice::Cancelled);
        }
        self.trail = None;
    }

    /// Collects a finished worker result, if any.
    pub fn poll(&mut self) -> SearchState {
        let received = match self.task.as_ref().map(|t| t.results.try_recv()) {
            None | Some(Err(TryRecvError::Empty)) => return self.state(),
            Some(Ok(result)) => Some(result),
            Some(Err(TryRecvError::Disconnected)) => None,
        };
        if let Some(task) = self.task.take() {
            let start = task.start;
            self.join(task);
            match received {
                Some(result) => self.apply(start, result),
                None => {
                    warn!(start = %start, "leak search worker exited without a result");
                    self.notice = Some(Notice::Cancelled);
                }
            }
        }
        self.state()
    }

    /// Per-tick update: polls the worker, counts the draw time down and
    /// periodically re-checks the shown path against `grid`. The path is
    /// dropped silently once it expires, the grid goes away, or any of its
    /// faces has been sealed since.
    pub fn tick<G: CubeGrid + ?Sized>(&mut self, grid: &G) -> SearchState {
        self.ticks = self.ticks.wrapping_add(1);
        self.poll();
        let interval = u64::from(self.options.seal_check_interval_ticks.max(1));
        let check = self.ticks % interval == 0;
        if let Some(trail) = self.trail.as_mut() {
            trail.ticks_remaining = trail.ticks_remaining.saturating_sub(1);
            if trail.ticks_remaining == 0 {
                self.trail = None;
            } else if check && (!grid.is_live() || trail.is_resealed(grid)) {
                debug!("leak path sealed, clearing");
                self.trail = None;
            }
        }
        self.state()
    }

    pub fn state(&self) -> SearchState {
        if self.task.is_some() {
            SearchState::Running
        } else if self.trail.is_some() {
            SearchState::Draw
        } else {
            SearchState::Idle
        }
    }

    pub fn status(&self) -> LeakStatus {
        match self.state() {
            SearchState::Idle => LeakStatus::Ready,
            SearchState::Running => LeakStatus::Computing,
            SearchState::Draw => LeakStatus::LeakFound,
        }
    }

    pub fn notice(&self) -> Option<Notice> { self.notice }

    pub fn trail(&self) -> Option<&LeakTrail> { self.trail.as_ref() }

    /// Counters of the last completed search; `None` while one is running.
    pub fn last_stats(&self) -> Option<SearchStats> { self.engine.as_ref().map(LeakSearch::stats) }

    /// True when no search scratch memory is held. Always false while a
    /// worker owns the engine.
    pub fn scratch_is_clear(&self) -> bool {
        self.task.is_none() && self.engine.as_ref().map_or(true, LeakSearch::is_clear)
    }

    fn apply(&mut self, start: GridCell, result: SearchResult) {
        match result {
            SearchResult::Found(segments) => {
                let ticks_remaining = self.options.draw_ticks_for(segments.len());
                if ticks_remaining == 0 {
                    info!(start = %start, segments = segments.len(), "leak found, draw budget is zero");
                    return;
                }
                info!(start = %start, segments = segments.len(), ticks_remaining, "leak found");
                self.trail = Some(LeakTrail { segments, ticks_remaining });
            }
            SearchResult::NoLeak => {
                info!(start = %start, "no leak");
                self.notice = Some(Notice::NoLeaks);
            }
            SearchResult::Cancelled => {
                info!(start = %start, "leak search cancelled");
                self.notice = Some(Notice::Cancelled);
            }
        }
    }

    /// Cancels and joins the running worker, if any. Returns whether one was
    /// running.
    fn abort(&mut self) -> bool {
        let Some(task) = self.task.take() else { return false };
        task.cancel.cancel();
        self.join(task);
        debug!("leak search aborted");
        true
    }

    fn join(&mut self, task: SearchTask) {
        match task.handle.join() {
            Ok(engine) => self.engine = Some(engine),
            Err(_) => {
                error!(start = %task.start, "leak search thread panicked outside the search");
                self.engine = Some(LeakSearch::new());
            }
        }
    }
}

impl Drop for LeakSearchService {
    fn drop(&mut self) {
        self.abort();
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
