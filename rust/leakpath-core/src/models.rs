use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One cube position in the grid lattice. Serialized as `[x, y, z]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[i32; 3]", into = "[i32; 3]")]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridCell {
    pub const ZERO: GridCell = GridCell { x: 0, y: 0, z: 0 };
    pub const ONE: GridCell = GridCell { x: 1, y: 1, z: 1 };
    /// Largest coordinate magnitude a grid may occupy, leaving headroom for
    /// stepping past the hull.
    pub const LIMIT: i32 = 1 << 24;

    pub const fn new(x: i32, y: i32, z: i32) -> Self { Self { x, y, z } }

    pub fn dot(self, other: GridCell) -> i32 { self.x * other.x + self.y * other.y + self.z * other.z }

    pub fn abs(self) -> GridCell { GridCell::new(self.x.abs(), self.y.abs(), self.z.abs()) }

    pub fn min(self, other: GridCell) -> GridCell {
        GridCell::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    pub fn max(self, other: GridCell) -> GridCell {
        GridCell::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    pub fn manhattan(self, other: GridCell) -> i32 {
        let d = (self - other).abs();
        d.x + d.y + d.z
    }

    pub fn is_within_limit(self) -> bool {
        [self.x, self.y, self.z].iter().all(|v| v.unsigned_abs() <= GridCell::LIMIT as u32)
    }

    pub fn axis(self, axis: usize) -> i32 {
        match axis { 0 => self.x, 1 => self.y, _ => self.z }
    }
}

impl From<[i32; 3]> for GridCell { fn from(v: [i32; 3]) -> Self { GridCell::new(v[0], v[1], v[2]) } }
impl From<GridCell> for [i32; 3] { fn from(c: GridCell) -> Self { [c.x, c.y, c.z] } }

impl Add for GridCell {
    type Output = GridCell;
    fn add(self, rhs: GridCell) -> GridCell { GridCell::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z) }
}

impl Sub for GridCell {
    type Output = GridCell;
    fn sub(self, rhs: GridCell) -> GridCell { GridCell::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z) }
}

impl Mul<i32> for GridCell {
    type Output = GridCell;
    fn mul(self, k: i32) -> GridCell { GridCell::new(self.x * k, self.y * k, self.z * k) }
}

impl Neg for GridCell {
    type Output = GridCell;
    fn neg(self) -> GridCell { GridCell::new(-self.x, -self.y, -self.z) }
}

impl Add<Direction> for GridCell {
    type Output = GridCell;
    fn add(self, rhs: Direction) -> GridCell { self + rhs.vector() }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl FromStr for GridCell {
    type Err = String;

    /// Parses `x,y,z` (whitespace around components is ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!("expected x,y,z but got `{}`", s));
        }
        let mut out = [0i32; 3];
        for (slot, part) in out.iter_mut().zip(parts) {
            *slot = part.parse::<i32>().map_err(|e| format!("bad coordinate `{}`: {}", part, e))?;
        }
        Ok(GridCell::from(out))
    }
}

/// Axis-aligned unit step. Forward is -Z, matching the block-local
/// convention where a block "faces" down its negative Z axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Fixed expansion order used by the search.
    pub const ALL: [Direction; 6] = [
        Direction::Forward,
        Direction::Backward,
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub const fn vector(self) -> GridCell {
        match self {
            Direction::Forward => GridCell::new(0, 0, -1),
            Direction::Backward => GridCell::new(0, 0, 1),
            Direction::Left => GridCell::new(-1, 0, 0),
            Direction::Right => GridCell::new(1, 0, 0),
            Direction::Up => GridCell::new(0, 1, 0),
            Direction::Down => GridCell::new(0, -1, 0),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Index in [`Direction::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Direction::Forward => 0,
            Direction::Backward => 1,
            Direction::Left => 2,
            Direction::Right => 3,
            Direction::Up => 4,
            Direction::Down => 5,
        }
    }

    /// 0 for X, 1 for Y, 2 for Z.
    pub const fn axis(self) -> usize {
        match self {
            Direction::Left | Direction::Right => 0,
            Direction::Up | Direction::Down => 1,
            Direction::Forward | Direction::Backward => 2,
        }
    }

    /// Inverse of [`Direction::vector`]; `None` unless `v` is a unit axis step.
    pub fn from_vector(v: GridCell) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.vector() == v)
    }

    pub fn cross(self, other: Direction) -> Option<Direction> {
        let a = self.vector();
        let b = other.vector();
        Direction::from_vector(GridCell::new(
            a.y * b.z - a.z * b.y,
            a.z * b.x - a.x * b.z,
            a.x * b.y - a.y * b.x,
        ))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        };
        f.write_str(s)
    }
}

/// One hop of a leak path, in lattice coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: GridCell,
    pub end: GridCell,
}

impl LineSegment {
    pub fn new(start: GridCell, end: GridCell) -> Self { Self { start, end } }

    /// Direction of travel, `None` for anything that is not a single axis step.
    pub fn direction(&self) -> Option<Direction> { Direction::from_vector(self.end - self.start) }
}

/// Inclusive integer extents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: GridCell,
    pub max: GridCell,
}

impl BoundingBox {
    pub fn new(a: GridCell, b: GridCell) -> Self { Self { min: a.min(b), max: a.max(b) } }

    pub fn from_cell(cell: GridCell) -> Self { Self { min: cell, max: cell } }

    pub fn include(&mut self, cell: GridCell) {
        self.min = self.min.min(cell);
        self.max = self.max.max(cell);
    }

    /// Grown by `by` cells on every side.
    pub fn inflate(&self, by: i32) -> BoundingBox {
        let d = GridCell::new(by, by, by);
        BoundingBox { min: self.min - d, max: self.max + d }
    }

    pub fn contains(&self, c: GridCell) -> bool {
        c.x >= self.min.x && c.x <= self.max.x
            && c.y >= self.min.y && c.y <= self.max.y
            && c.z >= self.min.z && c.z <= self.max.z
    }

    pub fn is_within_limit(&self) -> bool { self.min.is_within_limit() && self.max.is_within_limit() }

    pub fn size(&self) -> GridCell { self.max - self.min + GridCell::ONE }

    pub fn volume(&self) -> u64 {
        let s = self.size();
        (s.x as u64).saturating_mul(s.y as u64).saturating_mul(s.z as u64)
    }

    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        let (min, max) = (self.min, self.max);
        (min.z..=max.z).flat_map(move |z| {
            (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| GridCell::new(x, y, z)))
        })
    }

    /// True for cells on the outer layer of the box.
    pub fn on_surface(&self, c: GridCell) -> bool {
        self.contains(c)
            && (c.x == self.min.x || c.x == self.max.x
                || c.y == self.min.y || c.y == self.max.y
                || c.z == self.min.z || c.z == self.max.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_are_unit_and_paired() {
        for d in Direction::ALL {
            let v = d.vector();
            assert_eq!(v.abs().x + v.abs().y + v.abs().z, 1);
            assert_eq!(d.opposite().vector(), -v);
            assert_eq!(d.opposite().opposite(), d);
            assert_eq!(Direction::ALL[d.index()], d);
            assert_eq!(Direction::from_vector(v), Some(d));
        }
        assert_eq!(Direction::from_vector(GridCell::new(1, 1, 0)), None);
    }

    #[test]
    fn cross_follows_right_hand_rule() {
        assert_eq!(Direction::Up.cross(Direction::Backward), Some(Direction::Right));
        assert_eq!(Direction::Right.cross(Direction::Up), Some(Direction::Backward));
        assert_eq!(Direction::Up.cross(Direction::Down), None);
    }

    #[test]
    fn parses_cell_from_str() {
        assert_eq!("1, -2,3".parse::<GridCell>().unwrap(), GridCell::new(1, -2, 3));
        assert!("1,2".parse::<GridCell>().is_err());
        assert!("a,b,c".parse::<GridCell>().is_err());
    }

    #[test]
    fn cell_serializes_as_array() {
        let v = serde_json::to_value(GridCell::new(4, 5, 6)).unwrap();
        assert_eq!(v, serde_json::json!([4, 5, 6]));
    }

    #[test]
    fn bounding_box_inflate_and_surface() {
        let b = BoundingBox::new(GridCell::new(2, 2, 2), GridCell::ZERO);
        assert_eq!(b.min, GridCell::ZERO);
        assert_eq!(b.volume(), 27);
        assert_eq!(b.cells().count(), 27);
        assert!(b.on_surface(GridCell::new(0, 1, 1)));
        assert!(!b.on_surface(GridCell::new(1, 1, 1)));
        let big = b.inflate(1);
        assert!(big.contains(GridCell::new(-1, 3, 0)));
        assert!(!big.contains(GridCell::new(-2, 0, 0)));
    }
}
