//! Core connectivity graph structures.

use std::collections::HashMap;

use rr_core::LinkId;

/// A validated, immutable river connectivity graph.
///
/// `connections` is the forward (downstream-pointing) adjacency: each
/// link maps to its single downstream link, or to nothing when the link
/// is an outlet. `rconn` is the reverse view: each link maps to the set
/// of links draining into it, in table order. Both maps hold an entry
/// for every link so lookups never need a missing-key special case.
///
/// The graph is read-only after construction and safe to share across
/// workers by immutable borrow.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkGraph {
    pub(crate) order: Vec<LinkId>,
    pub(crate) connections: HashMap<LinkId, Vec<LinkId>>,
    pub(crate) rconn: HashMap<LinkId, Vec<LinkId>>,
    pub(crate) outlets: Vec<LinkId>,
}

impl NetworkGraph {
    /// Number of links in the graph.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All link ids in source-table order.
    pub fn link_ids(&self) -> &[LinkId] {
        &self.order
    }

    /// Forward adjacency: link id -> downstream link list (0 or 1 entries).
    pub fn connections(&self) -> &HashMap<LinkId, Vec<LinkId>> {
        &self.connections
    }

    /// Reverse adjacency: link id -> upstream link list.
    pub fn rconn(&self) -> &HashMap<LinkId, Vec<LinkId>> {
        &self.rconn
    }

    /// Outlets (tailwaters): links with no downstream link in the domain.
    pub fn outlets(&self) -> &[LinkId] {
        &self.outlets
    }

    pub fn contains(&self, id: LinkId) -> bool {
        self.connections.contains_key(&id)
    }

    /// The single downstream link of `id`, if it has one in the domain.
    pub fn downstream(&self, id: LinkId) -> Option<LinkId> {
        self.connections.get(&id).and_then(|d| d.first().copied())
    }

    /// Links draining directly into `id`.
    pub fn upstreams(&self, id: LinkId) -> &[LinkId] {
        self.rconn.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NetworkBuilder, SegmentRecord, TopologyCodes};

    fn two_link_graph() -> NetworkGraph {
        let mut builder = NetworkBuilder::new(TopologyCodes::default());
        builder.push_segment(SegmentRecord::new(1, 2, 100.0, 0));
        builder.push_segment(SegmentRecord::new(2, -999, 100.0, 0));
        builder.build().unwrap()
    }

    #[test]
    fn downstream_lookup() {
        let graph = two_link_graph();
        assert_eq!(graph.downstream(LinkId(1)), Some(LinkId(2)));
        assert_eq!(graph.downstream(LinkId(2)), None);
    }

    #[test]
    fn upstreams_of_missing_link_are_empty() {
        let graph = two_link_graph();
        assert!(graph.upstreams(LinkId(99)).is_empty());
    }
}
