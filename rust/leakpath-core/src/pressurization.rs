//! Airtightness of the face between two neighbouring grid cells.
//!
//! A face is sealed when either block touching it reports its own side of
//! the face as sealed. Each side is evaluated in that block's local frame,
//! so two neighbours can disagree; one "sealed" vote is enough.

use crate::block::{BlockVariant, PlacedBlock};
use crate::grid::CubeGrid;
use crate::models::{Direction, GridCell};

/// Is the face between `from` and `from + direction` airtight.
pub fn is_face_sealed<G: CubeGrid + ?Sized>(grid: &G, from: GridCell, direction: Direction) -> bool {
    let to = from + direction;
    let here = grid.block_at(from);
    let there = grid.block_at(to);
    match (here, there) {
        (None, None) => false,
        (Some(a), Some(b)) if a.id == b.id => a.definition.is_fully_airtight(),
        _ => {
            here.map(|b| block_seals_face(b, from, direction)).unwrap_or(false)
                || there.map(|b| block_seals_face(b, to, direction.opposite())).unwrap_or(false)
        }
    }
}

/// Does `block` seal the face of `cell` whose outward world normal is `normal`.
pub fn block_seals_face(block: &PlacedBlock, cell: GridCell, normal: Direction) -> bool {
    if !block.is_fully_built() {
        return false;
    }
    if let Some(airtight) = block.definition.airtight() {
        return airtight;
    }
    let local_normal = block.orientation.to_local(normal);
    match block.variant {
        BlockVariant::Plain => block.definition.table().is_sealed(block.local_cell(cell), local_normal),
        BlockVariant::StandardDoor { .. } | BlockVariant::AdvancedDoor { .. } => {
            // mount-point sides are the frame; the wall it is mounted on seals those
            block.variant.is_fully_closed() && !block.definition.has_mount_normal(local_normal)
        }
        BlockVariant::SlideDoor { .. } | BlockVariant::HangarDoor { .. } => {
            block.variant.is_fully_closed() && matches!(local_normal, Direction::Forward | Direction::Backward)
        }
    }
}
