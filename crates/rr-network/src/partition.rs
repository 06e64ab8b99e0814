//! Partitioning into independent, topologically ordered sub-networks.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use rayon::prelude::*;
use rr_core::{LinkId, WaterbodyId};
use tracing::debug;

use crate::graph::NetworkGraph;
use crate::waterbody::WaterbodyNetwork;

/// One routable unit in a tailwater's ordered sequence: either a single
/// channel segment or an entire waterbody treated atomically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reach {
    Segment(LinkId),
    Waterbody {
        id: WaterbodyId,
        members: Vec<LinkId>,
    },
}

impl Reach {
    /// Key of this reach in the (possibly broken) connectivity graph.
    pub fn key(&self) -> LinkId {
        match self {
            Reach::Segment(id) => *id,
            Reach::Waterbody { id, .. } => id.as_link(),
        }
    }
}

/// Partition of a network into independent sub-networks, one per
/// tailwater, each with an upstream-before-downstream reach order.
///
/// This is a description of available parallelism, not an execution
/// directive: sub-networks share no links and may be dispatched to
/// independent workers, while the order within one sub-network is a hard
/// precondition for the routing kernel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetworkPartition {
    independent_networks: BTreeMap<LinkId, BTreeSet<LinkId>>,
    reaches_by_tailwater: BTreeMap<LinkId, Vec<Reach>>,
}

impl NetworkPartition {
    /// Partition `graph` (already broken at waterbodies when breaking is
    /// enabled) into per-tailwater sub-networks.
    pub fn build(graph: &NetworkGraph, wbodies: &WaterbodyNetwork) -> Self {
        let waterbody_nodes: HashMap<LinkId, WaterbodyId> = wbodies
            .waterbody_ids()
            .map(|wb| (wb.as_link(), wb))
            .collect();

        let per_tailwater: Vec<(LinkId, BTreeSet<LinkId>, Vec<Reach>)> = graph
            .outlets()
            .par_iter()
            .map(|&tailwater| {
                let members = reverse_reachable(graph, tailwater);
                let order = reach_order(graph, &members);
                let reaches = order
                    .into_iter()
                    .map(|id| match waterbody_nodes.get(&id) {
                        Some(&wb) => Reach::Waterbody {
                            id: wb,
                            members: wbodies.members(wb).to_vec(),
                        },
                        None => Reach::Segment(id),
                    })
                    .collect();
                (tailwater, members, reaches)
            })
            .collect();

        let mut independent_networks = BTreeMap::new();
        let mut reaches_by_tailwater = BTreeMap::new();
        for (tailwater, members, reaches) in per_tailwater {
            independent_networks.insert(tailwater, members);
            reaches_by_tailwater.insert(tailwater, reaches);
        }

        let covered: usize = independent_networks.values().map(BTreeSet::len).sum();
        debug_assert_eq!(covered, graph.len(), "sub-networks must cover every link once");
        debug!(
            tailwaters = independent_networks.len(),
            links = covered,
            "network partitioned"
        );

        Self {
            independent_networks,
            reaches_by_tailwater,
        }
    }

    /// Tailwater id -> member link ids of its sub-network.
    pub fn independent_networks(&self) -> &BTreeMap<LinkId, BTreeSet<LinkId>> {
        &self.independent_networks
    }

    /// Tailwater id -> ordered reach sequence (upstream before downstream).
    pub fn reaches_by_tailwater(&self) -> &BTreeMap<LinkId, Vec<Reach>> {
        &self.reaches_by_tailwater
    }

    pub fn tailwaters(&self) -> impl Iterator<Item = LinkId> + '_ {
        self.reaches_by_tailwater.keys().copied()
    }

    /// Concatenation of every tailwater's reach keys, tailwaters in
    /// ascending order. Covers every link of the graph exactly once.
    pub fn flatten(&self) -> Vec<LinkId> {
        self.reaches_by_tailwater
            .values()
            .flat_map(|reaches| reaches.iter().map(Reach::key))
            .collect()
    }
}

/// All links draining to `tailwater`, found by reverse traversal.
fn reverse_reachable(graph: &NetworkGraph, tailwater: LinkId) -> BTreeSet<LinkId> {
    let mut members = BTreeSet::new();
    let mut queue = VecDeque::from([tailwater]);
    while let Some(id) = queue.pop_front() {
        if !members.insert(id) {
            continue;
        }
        queue.extend(graph.upstreams(id).iter().copied());
    }
    members
}

/// Kahn-style topological order of one sub-network.
///
/// A link becomes ready once all of its upstream links are ordered; ties
/// among simultaneously ready links break by ascending id so the order
/// is reproducible across runs.
fn reach_order(graph: &NetworkGraph, members: &BTreeSet<LinkId>) -> Vec<LinkId> {
    let mut pending: HashMap<LinkId, usize> = HashMap::with_capacity(members.len());
    let mut ready: BTreeSet<LinkId> = BTreeSet::new();
    for &id in members {
        let upstream_count = graph.upstreams(id).len();
        if upstream_count == 0 {
            ready.insert(id);
        } else {
            pending.insert(id, upstream_count);
        }
    }

    let mut order = Vec::with_capacity(members.len());
    while let Some(&id) = ready.iter().next() {
        ready.remove(&id);
        order.push(id);
        if let Some(downstream) = graph.downstream(id) {
            if let Some(remaining) = pending.get_mut(&downstream) {
                *remaining -= 1;
                if *remaining == 0 {
                    pending.remove(&downstream);
                    ready.insert(downstream);
                }
            }
        }
    }

    debug_assert!(pending.is_empty(), "acyclic sub-network must drain fully");
    order
}

/// Split an ordered reach sequence into chunks of at most `max_len`
/// reaches for finer-grained dispatch.
///
/// Chunk boundaries respect the total order: concatenating the chunks
/// reproduces the input sequence, so a chunk never runs before a chunk
/// holding one of its upstream dependencies. `max_len == 0` means no
/// splitting.
pub fn chunk_reaches(reaches: &[Reach], max_len: usize) -> Vec<Vec<Reach>> {
    if reaches.is_empty() {
        return Vec::new();
    }
    if max_len == 0 {
        return vec![reaches.to_vec()];
    }
    reaches.chunks(max_len).map(<[Reach]>::to_vec).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NetworkBuilder, SegmentRecord, TopologyCodes};

    fn confluence_graph() -> NetworkGraph {
        // 3 -> 1, 2 -> 1, 1 -> terminal
        let mut builder = NetworkBuilder::new(TopologyCodes::default());
        builder.push_segment(SegmentRecord::new(3, 1, 100.0, 0));
        builder.push_segment(SegmentRecord::new(2, 1, 100.0, 0));
        builder.push_segment(SegmentRecord::new(1, -999, 100.0, 0));
        builder.build().unwrap()
    }

    #[test]
    fn confluence_orders_upstream_first_ties_ascending() {
        let graph = confluence_graph();
        let partition = NetworkPartition::build(&graph, &WaterbodyNetwork::default());
        let reaches = &partition.reaches_by_tailwater()[&LinkId(1)];
        let keys: Vec<LinkId> = reaches.iter().map(Reach::key).collect();
        assert_eq!(keys, vec![LinkId(2), LinkId(3), LinkId(1)]);
    }

    #[test]
    fn chunking_preserves_the_total_order() {
        let graph = confluence_graph();
        let partition = NetworkPartition::build(&graph, &WaterbodyNetwork::default());
        let reaches = &partition.reaches_by_tailwater()[&LinkId(1)];

        let chunks = chunk_reaches(reaches, 2);
        assert_eq!(chunks.len(), 2);
        let rejoined: Vec<Reach> = chunks.into_iter().flatten().collect();
        assert_eq!(&rejoined, reaches);

        assert_eq!(chunk_reaches(reaches, 0), vec![reaches.clone()]);
        assert!(chunk_reaches(&[], 4).is_empty());
    }
}
