pub mod breadcrumbs;
pub mod frontier;
pub mod heuristics;
pub mod search;

pub use breadcrumbs::{Breadcrumbs, NodeId, PathNode};
pub use frontier::PriorityFrontier;
pub use heuristics::distance_to_box;
pub use search::{CancelToken, LeakSearch, MoveKey, SearchResult, SearchStats, VisitedSet};
