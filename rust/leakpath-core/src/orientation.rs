//! Block orientation: one of the 24 rotations of a cube, stored as the
//! world directions of the block's local Forward and Up axes.

use serde::{Deserialize, Serialize};

use crate::grid::GridError;
use crate::models::{Direction, GridCell};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "OrientationSpec", into = "OrientationSpec")]
pub struct Orientation {
    forward: Direction,
    up: Direction,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct OrientationSpec {
    forward: Direction,
    up: Direction,
}

impl TryFrom<OrientationSpec> for Orientation {
    type Error = GridError;
    fn try_from(s: OrientationSpec) -> Result<Self, Self::Error> { Orientation::new(s.forward, s.up) }
}

impl From<Orientation> for OrientationSpec {
    fn from(o: Orientation) -> Self { OrientationSpec { forward: o.forward, up: o.up } }
}

impl Default for Orientation {
    fn default() -> Self { Orientation::IDENTITY }
}

impl Orientation {
    pub const IDENTITY: Orientation = Orientation { forward: Direction::Forward, up: Direction::Up };

    pub fn new(forward: Direction, up: Direction) -> Result<Self, GridError> {
        if forward.axis() == up.axis() {
            return Err(GridError::InvalidOrientation { forward, up });
        }
        Ok(Self { forward, up })
    }

    /// All 24 valid orientations.
    pub fn all() -> impl Iterator<Item = Orientation> {
        Direction::ALL.into_iter().flat_map(|forward| {
            Direction::ALL
                .into_iter()
                .filter(move |up| up.axis() != forward.axis())
                .map(move |up| Orientation { forward, up })
        })
    }

    pub fn forward(&self) -> Direction { self.forward }
    pub fn up(&self) -> Direction { self.up }

    pub fn right(&self) -> Direction {
        // up and forward are perpendicular, so the cross product is a unit axis
        self.up.cross(self.forward.opposite()).unwrap_or(Direction::Right)
    }

    pub fn to_world(&self, local: Direction) -> Direction {
        match local {
            Direction::Forward => self.forward,
            Direction::Backward => self.forward.opposite(),
            Direction::Up => self.up,
            Direction::Down => self.up.opposite(),
            Direction::Right => self.right(),
            Direction::Left => self.right().opposite(),
        }
    }

    pub fn to_local(&self, world: Direction) -> Direction {
        Direction::ALL
            .into_iter()
            .find(|&local| self.to_world(local) == world)
            .unwrap_or(world)
    }

    fn rotate(&self, v: GridCell) -> GridCell {
        self.right().vector() * v.x + self.up.vector() * v.y + self.forward.opposite().vector() * v.z
    }

    fn unrotate(&self, v: GridCell) -> GridCell {
        GridCell::new(
            v.dot(self.right().vector()),
            v.dot(self.up.vector()),
            v.dot(self.forward.opposite().vector()),
        )
    }

    /// Offset that moves a rotated local box back onto a non-negative
    /// corner, so local `(0,0,0)..size` maps onto world `(0,0,0)..world_size`.
    fn shift(&self, size: GridCell) -> GridCell {
        let far = self.rotate(size - GridCell::ONE);
        GridCell::new((-far.x).max(0), (-far.y).max(0), (-far.z).max(0))
    }

    /// World-space extents of a block with local `size`.
    pub fn world_size(&self, size: GridCell) -> GridCell { self.rotate(size).abs() }

    /// Offset from the block's min corner of local cell `local`.
    pub fn local_to_world(&self, size: GridCell, local: GridCell) -> GridCell {
        self.rotate(local) + self.shift(size)
    }

    /// Inverse of [`Orientation::local_to_world`].
    pub fn world_to_local(&self, size: GridCell, offset: GridCell) -> GridCell {
        self.unrotate(offset - self.shift(size))
    }
}
