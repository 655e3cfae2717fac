pub mod models;
pub mod orientation;
pub mod block;
pub mod grid;
pub mod pressurization;
pub mod engine;
pub mod options;
pub mod lifecycle;

pub use block::{BlockDefinition, BlockId, BlockVariant, DoorFamily, MountPoint, PlacedBlock};
pub use engine::{CancelToken, LeakSearch, MoveKey, SearchResult, SearchStats};
pub use grid::{CubeGrid, GridError, GridSpec, LoadError, ShipGrid};
pub use lifecycle::{LeakSearchService, LeakStatus, LeakTrail, Notice, SearchState};
pub use models::{BoundingBox, Direction, GridCell, LineSegment};
pub use options::LeakOptions;
pub use orientation::Orientation;
pub use pressurization::is_face_sealed;

pub fn version() -> &'static str { env!("CARGO_PKG_VERSION") }
