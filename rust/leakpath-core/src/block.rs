use std::fmt;
use std::sync::Arc;

use bitvec::vec::BitVec;
use serde::{Deserialize, Serialize};

use crate::grid::GridError;
use crate::models::{Direction, GridCell};
use crate::orientation::Orientation;

const COVER_EPSILON: f32 = 1e-4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

/// Door subtypes. Each one has its own sealing rule, see
/// [`crate::pressurization::block_seals_face`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorFamily {
    Standard,
    Slide,
    Hangar,
    Advanced,
}

/// Attachment rectangle on one side of a block, in block-local cell units.
///
/// `start`/`end` are `(u, v)` coordinates on the side plane: `(z, y)` for
/// the X sides, `(x, z)` for the Y sides and `(x, y)` for the Z sides.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MountPoint {
    pub normal: Direction,
    pub start: [f32; 2],
    pub end: [f32; 2],
}

impl MountPoint {
    /// Covers the whole `normal` side of a block of local `size`.
    pub fn full(normal: Direction, size: GridCell) -> Self {
        let (u, v) = side_extent(normal, size);
        MountPoint { normal, start: [0.0, 0.0], end: [u as f32, v as f32] }
    }

    fn covers(&self, u: i32, v: i32) -> bool {
        let (u0, u1) = (self.start[0].min(self.end[0]), self.start[0].max(self.end[0]));
        let (v0, v1) = (self.start[1].min(self.end[1]), self.start[1].max(self.end[1]));
        u0 <= u as f32 + COVER_EPSILON
            && u1 >= (u + 1) as f32 - COVER_EPSILON
            && v0 <= v as f32 + COVER_EPSILON
            && v1 >= (v + 1) as f32 - COVER_EPSILON
    }
}

fn side_extent(normal: Direction, size: GridCell) -> (i32, i32) {
    match normal.axis() {
        0 => (size.z, size.y),
        1 => (size.x, size.z),
        _ => (size.x, size.y),
    }
}

fn side_coords(normal: Direction, cell: GridCell) -> (i32, i32) {
    match normal.axis() {
        0 => (cell.z, cell.y),
        1 => (cell.x, cell.z),
        _ => (cell.x, cell.y),
    }
}

/// Per local cell, per local face: is that face airtight on a finished,
/// non-door block. Six bits per cell, indexed by [`Direction::index`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AirtightTable {
    size: GridCell,
    bits: BitVec,
}

impl AirtightTable {
    pub fn empty(size: GridCell) -> Self {
        let cells = (size.x * size.y * size.z).max(0) as usize;
        Self { size, bits: BitVec::repeat(false, cells * 6) }
    }

    /// Derives the table from mount points: an outer face of a cell is
    /// sealed when a single mount point on that side covers it entirely.
    /// Faces between two cells of the same block are never in the table.
    pub fn from_mount_points(size: GridCell, mount_points: &[MountPoint]) -> Self {
        let mut table = Self::empty(size);
        for z in 0..size.z {
            for y in 0..size.y {
                for x in 0..size.x {
                    let cell = GridCell::new(x, y, z);
                    for face in Direction::ALL {
                        if !Self::on_boundary(size, cell, face) { continue; }
                        let (u, v) = side_coords(face, cell);
                        let sealed = mount_points.iter().any(|mp| mp.normal == face && mp.covers(u, v));
                        if sealed { table.set(cell, face, true); }
                    }
                }
            }
        }
        table
    }

    fn on_boundary(size: GridCell, cell: GridCell, face: Direction) -> bool {
        match face {
            Direction::Left => cell.x == 0,
            Direction::Right => cell.x == size.x - 1,
            Direction::Down => cell.y == 0,
            Direction::Up => cell.y == size.y - 1,
            Direction::Forward => cell.z == 0,
            Direction::Backward => cell.z == size.z - 1,
        }
    }

    fn slot(&self, cell: GridCell, face: Direction) -> Option<usize> {
        let s = self.size;
        if cell.x < 0 || cell.y < 0 || cell.z < 0 || cell.x >= s.x || cell.y >= s.y || cell.z >= s.z {
            return None;
        }
        let idx = (cell.x + cell.y * s.x + cell.z * s.x * s.y) as usize;
        Some(idx * 6 + face.index())
    }

    pub fn set(&mut self, cell: GridCell, face: Direction, sealed: bool) {
        if let Some(i) = self.slot(cell, face) { self.bits.set(i, sealed); }
    }

    /// Cells outside the block are reported as unsealed.
    pub fn is_sealed(&self, cell: GridCell, face: Direction) -> bool {
        self.slot(cell, face).map(|i| self.bits[i]).unwrap_or(false)
    }

    pub fn sealed_faces(&self) -> usize { self.bits.count_ones() }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct BlockDefinitionSpec {
    id: String,
    #[serde(default = "unit_size")]
    size: GridCell,
    #[serde(default)]
    mount_points: Vec<MountPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    airtight: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    door: Option<DoorFamily>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    build_stages: Vec<f32>,
}

fn unit_size() -> GridCell { GridCell::ONE }

/// Static data shared by every block of one type.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "BlockDefinitionSpec", into = "BlockDefinitionSpec")]
pub struct BlockDefinition {
    id: String,
    size: GridCell,
    mount_points: Vec<MountPoint>,
    airtight: Option<bool>,
    door: Option<DoorFamily>,
    build_stages: Vec<f32>,
    table: AirtightTable,
}

impl TryFrom<BlockDefinitionSpec> for BlockDefinition {
    type Error = GridError;

    fn try_from(s: BlockDefinitionSpec) -> Result<Self, Self::Error> {
        let mut def = BlockDefinition::try_new(s.id, s.size)?;
        def.mount_points = s.mount_points;
        def.airtight = s.airtight;
        def.door = s.door;
        def.build_stages = s.build_stages;
        def.rebuild_table();
        Ok(def)
    }
}

impl From<BlockDefinition> for BlockDefinitionSpec {
    fn from(d: BlockDefinition) -> Self {
        BlockDefinitionSpec {
            id: d.id,
            size: d.size,
            mount_points: d.mount_points,
            airtight: d.airtight,
            door: d.door,
            build_stages: d.build_stages,
        }
    }
}

impl BlockDefinition {
    /// Longest edge a block may have, in cells.
    pub const MAX_EDGE: i32 = 64;

    pub fn try_new(id: impl Into<String>, size: GridCell) -> Result<Self, GridError> {
        let edge = 1..=Self::MAX_EDGE;
        if !(edge.contains(&size.x) && edge.contains(&size.y) && edge.contains(&size.z)) {
            return Err(GridError::InvalidSize(size));
        }
        Ok(Self {
            id: id.into(),
            size,
            mount_points: Vec::new(),
            airtight: None,
            door: None,
            build_stages: Vec::new(),
            table: AirtightTable::empty(size),
        })
    }

    /// A single-cell definition with no mount points.
    pub fn cube(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            size: GridCell::ONE,
            mount_points: Vec::new(),
            airtight: None,
            door: None,
            build_stages: Vec::new(),
            table: AirtightTable::empty(GridCell::ONE),
        }
    }

    pub fn with_mount_point(mut self, mp: MountPoint) -> Self {
        self.mount_points.push(mp);
        self.rebuild_table();
        self
    }

    /// Mount points covering all six sides.
    pub fn with_full_mount_points(mut self) -> Self {
        let size = self.size;
        self.mount_points.extend(Direction::ALL.into_iter().map(|d| MountPoint::full(d, size)));
        self.rebuild_table();
        self
    }

    pub fn with_airtight(mut self, airtight: bool) -> Self {
        self.airtight = Some(airtight);
        self
    }

    pub fn with_door(mut self, family: DoorFamily) -> Self {
        self.door = Some(family);
        self
    }

    pub fn with_build_stages(mut self, stages: Vec<f32>) -> Self {
        self.build_stages = stages;
        self
    }

    fn rebuild_table(&mut self) {
        self.table = AirtightTable::from_mount_points(self.size, &self.mount_points);
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn size(&self) -> GridCell { self.size }
    pub fn table(&self) -> &AirtightTable { &self.table }
    pub fn door(&self) -> Option<DoorFamily> { self.door }

    /// Definition-level override: `Some(true)` seals every face, `Some(false)` none.
    pub fn airtight(&self) -> Option<bool> { self.airtight }

    pub fn is_fully_airtight(&self) -> bool { self.airtight == Some(true) }

    pub fn has_mount_normal(&self, local: Direction) -> bool {
        self.mount_points.iter().any(|mp| mp.normal == local)
    }

    /// Build ratio a block must reach before it counts as finished: the
    /// upper bound of its last build-progress stage, or 0 without stages.
    pub fn completion_threshold(&self) -> f32 {
        self.build_stages.iter().copied().fold(0.0, f32::max)
    }
}

/// Per-instance state that selects the sealing rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BlockVariant {
    Plain,
    StandardDoor { closed_ratio: f32 },
    SlideDoor { closed_ratio: f32 },
    HangarDoor { closed_ratio: f32 },
    AdvancedDoor { fully_closed: bool },
}

impl BlockVariant {
    pub fn for_definition(def: &BlockDefinition, closed_ratio: f32) -> Self {
        let closed_ratio = closed_ratio.clamp(0.0, 1.0);
        match def.door() {
            None => BlockVariant::Plain,
            Some(DoorFamily::Standard) => BlockVariant::StandardDoor { closed_ratio },
            Some(DoorFamily::Slide) => BlockVariant::SlideDoor { closed_ratio },
            Some(DoorFamily::Hangar) => BlockVariant::HangarDoor { closed_ratio },
            Some(DoorFamily::Advanced) => BlockVariant::AdvancedDoor { fully_closed: closed_ratio >= 1.0 },
        }
    }

    pub fn is_door(&self) -> bool { !matches!(self, BlockVariant::Plain) }

    /// Doors only; plain blocks report `false`.
    pub fn is_fully_closed(&self) -> bool {
        match *self {
            BlockVariant::Plain => false,
            BlockVariant::StandardDoor { closed_ratio }
            | BlockVariant::SlideDoor { closed_ratio }
            | BlockVariant::HangarDoor { closed_ratio } => closed_ratio >= 1.0,
            BlockVariant::AdvancedDoor { fully_closed } => fully_closed,
        }
    }
}

/// A block instance on a grid.
#[derive(Clone, Debug)]
pub struct PlacedBlock {
    pub id: BlockId,
    pub definition: Arc<BlockDefinition>,
    /// World min corner of the block's footprint.
    pub min: GridCell,
    pub orientation: Orientation,
    pub build_ratio: f32,
    pub variant: BlockVariant,
}

impl PlacedBlock {
    pub fn world_size(&self) -> GridCell { self.orientation.world_size(self.definition.size()) }

    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        let size = self.definition.size();
        (0..size.z).flat_map(move |z| {
            (0..size.y).flat_map(move |y| {
                (0..size.x).map(move |x| self.min + self.orientation.local_to_world(size, GridCell::new(x, y, z)))
            })
        })
    }

    pub fn local_cell(&self, world: GridCell) -> GridCell {
        self.orientation.world_to_local(self.definition.size(), world - self.min)
    }

    pub fn is_fully_built(&self) -> bool { self.build_ratio >= self.definition.completion_threshold() }
}
