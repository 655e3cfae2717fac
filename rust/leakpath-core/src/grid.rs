use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::block::{BlockDefinition, BlockId, BlockVariant, PlacedBlock};
use crate::models::{BoundingBox, Direction, GridCell};
use crate::orientation::Orientation;
use crate::pressurization;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("block size must be between 1 and 64 on every axis, got {0}")]
    InvalidSize(GridCell),
    #[error("forward `{forward}` and up `{up}` are not perpendicular")]
    InvalidOrientation { forward: Direction, up: Direction },
    #[error("cell {cell} is already occupied by block {existing}")]
    Occupied { cell: GridCell, existing: BlockId },
    #[error("unknown block definition `{0}`")]
    UnknownDefinition(String),
    #[error("block definition `{0}` is declared twice")]
    DuplicateDefinition(String),
    #[error("no block {0} on this grid")]
    UnknownBlock(BlockId),
    #[error("block {0} is not a door")]
    NotADoor(BlockId),
    #[error("cell {0} is outside the supported coordinate range")]
    OutOfRange(GridCell),
    #[error("box fill of {cells} cells exceeds the limit of {limit}")]
    FillTooLarge { cells: u64, limit: u64 },
}

/// Errors from [`ShipGrid::from_json`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid grid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// What the leak search needs from a grid.
pub trait CubeGrid {
    fn block_at(&self, cell: GridCell) -> Option<&PlacedBlock>;

    /// Extents of all occupied cells, `None` for an empty grid.
    fn bounds(&self) -> Option<BoundingBox>;

    /// False once the grid has been closed or destroyed.
    fn is_live(&self) -> bool { true }

    fn is_face_sealed(&self, from: GridCell, direction: Direction) -> bool {
        pressurization::is_face_sealed(self, from, direction)
    }
}

/// In-memory ship grid: block arena plus cell occupancy.
pub struct ShipGrid {
    name: String,
    blocks: Vec<Option<PlacedBlock>>,
    cells: FxHashMap<GridCell, BlockId>,
    bounds: Option<BoundingBox>,
    closed: AtomicBool,
}

impl Clone for ShipGrid {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            blocks: self.blocks.clone(),
            cells: self.cells.clone(),
            bounds: self.bounds,
            closed: AtomicBool::new(self.closed.load(Ordering::Relaxed)),
        }
    }
}

impl std::fmt::Debug for ShipGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShipGrid")
            .field("name", &self.name)
            .field("blocks", &self.block_count())
            .field("bounds", &self.bounds)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}

impl CubeGrid for ShipGrid {
    fn block_at(&self, cell: GridCell) -> Option<&PlacedBlock> {
        let id = self.cells.get(&cell)?;
        self.blocks.get(id.0 as usize)?.as_ref()
    }

    fn bounds(&self) -> Option<BoundingBox> { self.bounds }

    fn is_live(&self) -> bool { !self.closed.load(Ordering::Acquire) }
}

impl ShipGrid {
    /// Most cells one grid description may fill through `boxes`.
    pub const MAX_FILL_CELLS: u64 = 1 << 21;

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blocks: Vec::new(),
            cells: FxHashMap::default(),
            bounds: None,
            closed: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn block_count(&self) -> usize { self.blocks().count() }

    pub fn blocks(&self) -> impl Iterator<Item = &PlacedBlock> { self.blocks.iter().flatten() }

    pub fn block(&self, id: BlockId) -> Option<&PlacedBlock> { self.blocks.get(id.0 as usize)?.as_ref() }

    fn block_mut(&mut self, id: BlockId) -> Result<&mut PlacedBlock, GridError> {
        self.blocks
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(GridError::UnknownBlock(id))
    }

    /// Places a finished block (doors start fully closed).
    pub fn place(&mut self, definition: Arc<BlockDefinition>, min: GridCell, orientation: Orientation) -> Result<BlockId, GridError> {
        if !min.is_within_limit() {
            return Err(GridError::OutOfRange(min));
        }
        let id = BlockId(self.blocks.len() as u32);
        let variant = BlockVariant::for_definition(&definition, 1.0);
        let block = PlacedBlock { id, definition, min, orientation, build_ratio: 1.0, variant };
        let far = min + block.world_size() - GridCell::ONE;
        if !far.is_within_limit() {
            return Err(GridError::OutOfRange(far));
        }
        let cells: Vec<GridCell> = block.cells().collect();
        for &cell in &cells {
            if let Some(&existing) = self.cells.get(&cell) {
                return Err(GridError::Occupied { cell, existing });
            }
        }
        for &cell in &cells {
            self.cells.insert(cell, id);
            match self.bounds.as_mut() {
                Some(b) => b.include(cell),
                None => self.bounds = Some(BoundingBox::from_cell(cell)),
            }
        }
        self.blocks.push(Some(block));
        Ok(id)
    }

    pub fn remove(&mut self, id: BlockId) -> Result<PlacedBlock, GridError> {
        let block = self
            .blocks
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .ok_or(GridError::UnknownBlock(id))?;
        for cell in block.cells() {
            self.cells.remove(&cell);
        }
        self.recompute_bounds();
        Ok(block)
    }

    /// Removes whatever occupies `cell`.
    pub fn remove_at(&mut self, cell: GridCell) -> Option<PlacedBlock> {
        let id = *self.cells.get(&cell)?;
        self.remove(id).ok()
    }

    fn recompute_bounds(&mut self) {
        let mut keys = self.cells.keys();
        self.bounds = keys.next().map(|&first| {
            let mut b = BoundingBox::from_cell(first);
            for &c in keys { b.include(c); }
            b
        });
    }

    /// 0.0 is fully open, 1.0 fully closed.
    pub fn set_closed_ratio(&mut self, id: BlockId, closed_ratio: f32) -> Result<(), GridError> {
        let block = self.block_mut(id)?;
        if !block.variant.is_door() {
            return Err(GridError::NotADoor(id));
        }
        block.variant = BlockVariant::for_definition(&block.definition, closed_ratio);
        Ok(())
    }

    pub fn set_build_ratio(&mut self, id: BlockId, build_ratio: f32) -> Result<(), GridError> {
        self.block_mut(id)?.build_ratio = build_ratio.clamp(0.0, 1.0);
        Ok(())
    }

    /// Marks the grid destroyed. Searches running against it stop at their
    /// next cancellation check.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn from_spec(spec: GridSpec) -> Result<Self, GridError> {
        let mut defs: IndexMap<String, Arc<BlockDefinition>> = IndexMap::with_capacity(spec.definitions.len());
        for def in spec.definitions {
            let key = def.id().to_string();
            if defs.contains_key(&key) {
                return Err(GridError::DuplicateDefinition(key));
            }
            defs.insert(key, Arc::new(def));
        }
        let lookup = |name: &str| defs.get(name).cloned().ok_or_else(|| GridError::UnknownDefinition(name.to_string()));

        let mut grid = ShipGrid::new(spec.name);
        for b in spec.blocks {
            let id = grid.place(lookup(&b.definition)?, b.position, b.orientation)?;
            if let Some(ratio) = b.closed_ratio {
                grid.set_closed_ratio(id, ratio)?;
            }
            if b.build_ratio < 1.0 {
                grid.set_build_ratio(id, b.build_ratio)?;
            }
        }
        let mut filled = 0u64;
        for fill in &spec.boxes {
            let bbox = BoundingBox::new(fill.min, fill.max);
            if !bbox.is_within_limit() {
                let cell = if bbox.min.is_within_limit() { bbox.max } else { bbox.min };
                return Err(GridError::OutOfRange(cell));
            }
            filled = filled.saturating_add(bbox.volume());
        }
        if filled > Self::MAX_FILL_CELLS {
            return Err(GridError::FillTooLarge { cells: filled, limit: Self::MAX_FILL_CELLS });
        }
        for fill in spec.boxes {
            let def = lookup(&fill.definition)?;
            let bbox = BoundingBox::new(fill.min, fill.max);
            for cell in bbox.cells() {
                if fill.hollow && !bbox.on_surface(cell) { continue; }
                if fill.skip_occupied && grid.cells.contains_key(&cell) { continue; }
                grid.place(Arc::clone(&def), cell, Orientation::IDENTITY)?;
            }
        }
        debug!(name = %grid.name, blocks = grid.block_count(), "grid built from description");
        Ok(grid)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, LoadError> {
        let spec: GridSpec = serde_json::from_slice(bytes)?;
        Ok(Self::from_spec(spec)?)
    }
}

/// JSON description of a grid.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GridSpec {
    #[serde(default)]
    pub name: String,
    pub definitions: Vec<BlockDefinition>,
    #[serde(default)]
    pub blocks: Vec<BlockSpec>,
    #[serde(default)]
    pub boxes: Vec<BoxSpec>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockSpec {
    pub definition: String,
    /// World min corner.
    pub position: GridCell,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default = "fully_built")]
    pub build_ratio: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_ratio: Option<f32>,
}

fn fully_built() -> f32 { 1.0 }

/// Fills `min..=max` with single-cell blocks of one definition.
/// Boxes are applied after `blocks`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoxSpec {
    pub definition: String,
    pub min: GridCell,
    pub max: GridCell,
    /// Only the outer layer.
    #[serde(default)]
    pub hollow: bool,
    /// Leave cells already taken by `blocks` alone instead of failing.
    #[serde(default)]
    pub skip_occupied: bool,
}
