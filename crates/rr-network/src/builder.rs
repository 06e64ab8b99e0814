//! Incremental network builder.

use std::collections::{HashMap, HashSet};

use rr_core::LinkId;
use tracing::debug;

use crate::error::{NetworkError, NetworkResult};
use crate::graph::NetworkGraph;
use crate::records::{SegmentRecord, TopologyCodes};

/// Builder for constructing a connectivity graph from segment records.
///
/// Use `push_segment` to feed table rows in source order, then call
/// `build()` to validate and freeze the graph. Validation rejects
/// duplicate ids, self-loops, and multi-hop cycles before any traversal
/// is attempted.
#[derive(Debug)]
pub struct NetworkBuilder {
    codes: TopologyCodes,
    records: Vec<SegmentRecord>,
}

impl NetworkBuilder {
    pub fn new(codes: TopologyCodes) -> Self {
        Self {
            codes,
            records: Vec::new(),
        }
    }

    pub fn push_segment(&mut self, record: SegmentRecord) {
        self.records.push(record);
    }

    pub fn extend_segments(&mut self, records: impl IntoIterator<Item = SegmentRecord>) {
        self.records.extend(records);
    }

    pub fn codes(&self) -> TopologyCodes {
        self.codes
    }

    pub fn records(&self) -> &[SegmentRecord] {
        &self.records
    }

    /// Build and validate the graph, returning an immutable `NetworkGraph`.
    pub fn build(self) -> NetworkResult<NetworkGraph> {
        let mut order = Vec::with_capacity(self.records.len());
        let mut seen = HashSet::with_capacity(self.records.len());
        for rec in &self.records {
            if !seen.insert(rec.id) {
                return Err(NetworkError::DuplicateSegment { id: rec.id });
            }
            if rec.downstream_id == rec.id {
                return Err(NetworkError::SelfLoop { id: rec.id });
            }
            order.push(rec.id);
        }

        // Forward adjacency. A downstream id that is neither the terminal
        // sentinel nor present in the table points outside the modeled
        // domain and is treated as terminal.
        let mut connections: HashMap<LinkId, Vec<LinkId>> = HashMap::with_capacity(order.len());
        for rec in &self.records {
            let downstream = if rec.is_terminal(self.codes) || !seen.contains(&rec.downstream_id) {
                if !rec.is_terminal(self.codes) {
                    debug!(
                        segment = %rec.id,
                        downstream = %rec.downstream_id,
                        "downstream id outside modeled domain, treating as terminal"
                    );
                }
                Vec::new()
            } else {
                vec![rec.downstream_id]
            };
            connections.insert(rec.id, downstream);
        }

        detect_cycles(&order, &connections)?;

        // Reverse adjacency, upstream lists in table order.
        let mut rconn: HashMap<LinkId, Vec<LinkId>> = HashMap::with_capacity(order.len());
        for &id in &order {
            rconn.insert(id, Vec::new());
        }
        for &id in &order {
            if let Some(&downstream) = connections[&id].first() {
                rconn.get_mut(&downstream).expect("downstream in table").push(id);
            }
        }

        let outlets: Vec<LinkId> = order
            .iter()
            .copied()
            .filter(|id| connections[id].is_empty())
            .collect();

        debug!(
            links = order.len(),
            outlets = outlets.len(),
            "connectivity graph built"
        );

        Ok(NetworkGraph {
            order,
            connections,
            rconn,
            outlets,
        })
    }
}

/// Reject cycles before any downstream traversal runs.
///
/// Every link has at most one downstream link, so the forward graph is a
/// functional graph: chasing downstream pointers from each unvisited link
/// either terminates or closes a cycle. Links are visited in table order,
/// which makes the reported chains deterministic.
pub(crate) fn detect_cycles(
    order: &[LinkId],
    connections: &HashMap<LinkId, Vec<LinkId>>,
) -> NetworkResult<()> {
    let mut resolved: HashSet<LinkId> = HashSet::with_capacity(order.len());
    let mut chains: Vec<Vec<LinkId>> = Vec::new();

    for &start in order {
        if resolved.contains(&start) {
            continue;
        }
        let mut walk: Vec<LinkId> = Vec::new();
        let mut on_walk: HashMap<LinkId, usize> = HashMap::new();
        let mut current = start;
        loop {
            if let Some(&pos) = on_walk.get(&current) {
                // Closed a loop: report it from its first occurrence.
                let mut chain = walk[pos..].to_vec();
                chain.push(current);
                chains.push(chain);
                break;
            }
            if resolved.contains(&current) {
                break;
            }
            on_walk.insert(current, walk.len());
            walk.push(current);
            match connections[&current].first() {
                Some(&next) => current = next,
                None => break,
            }
        }
        resolved.extend(walk);
    }

    if chains.is_empty() {
        Ok(())
    } else {
        Err(NetworkError::Cycles { chains })
    }
}
