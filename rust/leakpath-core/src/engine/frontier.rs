use super::breadcrumbs::{Breadcrumbs, NodeId};

/// Min-priority queue over [`Breadcrumbs`] nodes, kept as a singly linked
/// list threaded through `PathNode::frontier_next`.
///
/// Ordering is ascending by `total_cost`. Pop is O(1); insert walks the list
/// and is O(n). A new node is linked in front of every node with the same
/// `total_cost`, so among ties the most recently queued node pops first and
/// the walk stops as soon as it reaches the tie run.
///
/// The frontier never owns nodes; it only links ids that live in the arena
/// passed to each call. Always pass the same arena.
#[derive(Debug, Default)]
pub struct PriorityFrontier {
    head: Option<NodeId>,
    len: usize,
}

impl PriorityFrontier {
    pub fn new() -> Self { Self::default() }

    /// Link `id` into the list at its cost position.
    pub fn insert(&mut self, crumbs: &mut Breadcrumbs, id: NodeId) {
        let cost = crumbs[id].total_cost;
        match self.head {
            Some(head) if crumbs[head].total_cost < cost => {
                let mut cur = head;
                while let Some(next) = crumbs[cur].frontier_next {
                    if crumbs[next].total_cost >= cost {
                        break;
                    }
                    cur = next;
                }
                crumbs[id].frontier_next = crumbs[cur].frontier_next;
                crumbs[cur].frontier_next = Some(id);
            }
            _ => {
                crumbs[id].frontier_next = self.head;
                self.head = Some(id);
            }
        }
        self.len += 1;
    }

    /// Unlink and return the cheapest node.
    pub fn pop(&mut self, crumbs: &mut Breadcrumbs) -> Option<NodeId> {
        let head = self.head?;
        self.head = crumbs[head].frontier_next.take();
        self.len -= 1;
        Some(head)
    }

    pub fn peek(&self) -> Option<NodeId> { self.head }

    /// Forget every node. Links left inside the arena are stale after this,
    /// so clear the arena too before reusing ids.
    pub fn clear(&mut self) {
        self.head = None;
        self.len = 0;
    }

    pub fn is_empty(&self) -> bool { self.head.is_none() }

    pub fn len(&self) -> usize { self.len }
}
