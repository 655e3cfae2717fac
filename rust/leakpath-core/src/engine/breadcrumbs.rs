use std::ops::{Index, IndexMut};

use crate::models::{GridCell, LineSegment};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize { self.0 as usize }
}

/// One search node. `predecessor` forms the backtrack chain,
/// `frontier_next` is only used by [`super::PriorityFrontier`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathNode {
    pub position: GridCell,
    /// Estimated total cost (f).
    pub total_cost: i32,
    /// Hops from the start (g).
    pub path_cost: i32,
    pub predecessor: Option<NodeId>,
    pub(crate) frontier_next: Option<NodeId>,
}

impl PathNode {
    pub fn new(position: GridCell, path_cost: i32, total_cost: i32, predecessor: Option<NodeId>) -> Self {
        Self { position, total_cost, path_cost, predecessor, frontier_next: None }
    }
}

/// Arena owning every node created during one search.
#[derive(Debug, Default)]
pub struct Breadcrumbs {
    nodes: Vec<PathNode>,
}

impl Breadcrumbs {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, node: PathNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn len(&self) -> usize { self.nodes.len() }

    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    /// Drops all nodes but keeps the allocation for the next search.
    pub fn clear(&mut self) { self.nodes.clear(); }

    /// Positions from `id` back to the start node.
    pub fn trail(&self, id: NodeId) -> impl Iterator<Item = GridCell> + '_ {
        std::iter::successors(Some(id), move |&n| self[n].predecessor).map(move |n| self[n].position)
    }

    /// Segments from the start node to `id`, innermost first.
    pub fn segments_to(&self, id: NodeId) -> Vec<LineSegment> {
        let mut cells: Vec<GridCell> = self.trail(id).collect();
        cells.reverse();
        cells.windows(2).map(|w| LineSegment::new(w[0], w[1])).collect()
    }
}

impl Index<NodeId> for Breadcrumbs {
    type Output = PathNode;
    fn index(&self, id: NodeId) -> &PathNode { &self.nodes[id.index()] }
}

impl IndexMut<NodeId> for Breadcrumbs {
    fn index_mut(&mut self, id: NodeId) -> &mut PathNode { &mut self.nodes[id.index()] }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_follow_predecessors_from_the_start() {
        let mut crumbs = Breadcrumbs::new();
        let a = crumbs.push(PathNode::new(GridCell::new(0, 0, 0), 0, 2, None));
        let b = crumbs.push(PathNode::new(GridCell::new(1, 0, 0), 1, 2, Some(a)));
        let _dead_end = crumbs.push(PathNode::new(GridCell::new(0, 1, 0), 1, 3, Some(a)));
        let c = crumbs.push(PathNode::new(GridCell::new(2, 0, 0), 2, 2, Some(b)));

        let segs = crumbs.segments_to(c);
        assert_eq!(segs, vec![
            LineSegment::new(GridCell::new(0, 0, 0), GridCell::new(1, 0, 0)),
            LineSegment::new(GridCell::new(1, 0, 0), GridCell::new(2, 0, 0)),
        ]);
        assert!(crumbs.segments_to(a).is_empty());
    }

    #[test]
    fn clear_empties_the_arena() {
        let mut crumbs = Breadcrumbs::new();
        crumbs.push(PathNode::new(GridCell::ZERO, 0, 0, None));
        assert_eq!(crumbs.len(), 1);
        crumbs.clear();
        assert!(crumbs.is_empty());
    }
}
