use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::Context;
use arc_swap::ArcSwap;
use leakpath_core::{BlockId, CubeGrid, GridCell, GridError, LeakOptions, LeakSearchService, SearchState, ShipGrid};
use tracing::{debug, info};

use crate::models::{state_name, GridSummary, LeakReport};

/// The live ship grid plus the leak search driven against it.
///
/// Readers take a cheap snapshot of the grid; edits clone it, mutate the
/// clone and publish it, so a running search keeps the snapshot it started
/// on. The periodic seal check always runs against the current grid.
pub struct ShipHost {
    grid: ArcSwap<ShipGrid>,
    edit: Mutex<()>,
    leaks: Mutex<LeakSearchService>,
    ticks: AtomicU64,
}

impl std::fmt::Debug for ShipHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShipHost")
            .field("grid", &self.grid.load().name())
            .field("ticks", &self.ticks())
            .finish()
    }
}

impl ShipHost {
    pub fn new(grid: ShipGrid, options: LeakOptions) -> Self {
        Self {
            grid: ArcSwap::from_pointee(grid),
            edit: Mutex::new(()),
            leaks: Mutex::new(LeakSearchService::new(options)),
            ticks: AtomicU64::new(0),
        }
    }

    pub fn grid(&self) -> Arc<ShipGrid> { self.grid.load_full() }

    pub fn summary(&self) -> GridSummary {
        let g = self.grid.load();
        GridSummary { name: g.name().to_string(), blocks: g.block_count(), bounds: g.bounds() }
    }

    /// Swaps in a new grid. The old one is closed and any search or shown
    /// path is dropped.
    pub fn replace_grid(&self, grid: ShipGrid) {
        let _edit = lock(&self.edit);
        info!(name = %grid.name(), blocks = grid.block_count(), "replacing grid");
        let old = self.grid.swap(Arc::new(grid));
        old.close();
        self.leaks().cancel_and_clear();
    }

    pub fn set_door(&self, id: BlockId, closed_ratio: f32) -> Result<(), GridError> {
        let _edit = lock(&self.edit);
        let mut next = ShipGrid::clone(&self.grid.load());
        next.set_closed_ratio(id, closed_ratio)?;
        self.grid.store(Arc::new(next));
        debug!(block = %id, closed_ratio, "door updated");
        Ok(())
    }

    pub fn start_search(&self, start: GridCell) -> SearchState {
        let grid = self.grid();
        self.leaks().start(grid, start)
    }

    pub fn cancel_search(&self) { self.leaks().cancel_and_clear(); }

    pub fn tick(&self) -> SearchState {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        let grid = self.grid.load();
        self.leaks().tick(&**grid)
    }

    pub fn ticks(&self) -> u64 { self.ticks.load(Ordering::Relaxed) }

    pub fn report(&self) -> LeakReport {
        let mut leaks = self.leaks();
        let state = leaks.poll();
        let (segments, ticks_remaining) = leaks
            .trail()
            .map(|t| (t.segments.clone(), t.ticks_remaining))
            .unwrap_or_default();
        LeakReport {
            state: state_name(state).to_string(),
            status: leaks.status().to_string(),
            notice: leaks.notice().map(|n| n.to_string()),
            segments,
            ticks_remaining,
        }
    }

    fn leaks(&self) -> MutexGuard<'_, LeakSearchService> { lock(&self.leaks) }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> { m.lock().unwrap_or_else(PoisonError::into_inner) }

pub fn load_grid(path: &Path) -> anyhow::Result<ShipGrid> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read grid {:?}", path))?;
    let grid = ShipGrid::from_json(&bytes).with_context(|| format!("failed to build grid from {:?}", path))?;
    Ok(grid)
}

/// Drives [`ShipHost::tick`] at a fixed period until the task is aborted.
pub fn spawn_ticker(host: Arc<ShipHost>, period: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            host.tick();
        }
    })
}
