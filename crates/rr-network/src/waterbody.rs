//! Waterbody membership resolution and network breaking.

use std::collections::{BTreeMap, HashMap, HashSet};

use rr_core::{LinkId, WaterbodyId};
use tracing::{debug, warn};

use crate::error::{NetworkError, NetworkResult};
use crate::graph::NetworkGraph;
use crate::records::{SegmentRecord, TopologyCodes};

/// Reservoir computation scheme assigned to a waterbody.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaterbodyKind {
    /// Level-pool storage routing from static parameters.
    LevelPool,
    /// Level-pool hybrid with persistence of USGS observations.
    HybridUsgs,
    /// Level-pool hybrid with persistence of USACE observations.
    HybridUsace,
    /// Forecast-informed (RFC time series) operation.
    Rfc,
}

/// Static hydraulic parameters of one waterbody.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaterbodyParams {
    pub area_sq_km: f64,
    pub weir_coeff: f64,
    pub weir_length_m: f64,
    pub orifice_coeff: f64,
    pub orifice_area_sq_m: f64,
    pub max_elevation_m: f64,
    pub initial_elevation_m: f64,
    pub kind: WaterbodyKind,
}

/// Parameter table keyed by waterbody id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaterbodyTable {
    params: BTreeMap<WaterbodyId, WaterbodyParams>,
}

impl WaterbodyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: WaterbodyId, params: WaterbodyParams) {
        self.params.insert(id, params);
    }

    pub fn contains(&self, id: WaterbodyId) -> bool {
        self.params.contains_key(&id)
    }

    pub fn get(&self, id: WaterbodyId) -> Option<&WaterbodyParams> {
        self.params.get(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = WaterbodyId> + '_ {
        self.params.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Policy for segments that reference a waterbody id missing from the
/// parameter table. Production runs keep the default `Error`; degrading
/// to a plain channel segment must be an explicit opt-in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownWaterbodyPolicy {
    #[default]
    Error,
    DegradeToSegment,
}

/// Resolved waterbody membership for one network.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaterbodyNetwork {
    /// Segment id -> waterbody id, member segments only.
    crosswalk: BTreeMap<LinkId, WaterbodyId>,
    /// Waterbody id -> member segments in table order.
    members: BTreeMap<WaterbodyId, Vec<LinkId>>,
}

impl WaterbodyNetwork {
    /// Resolve membership from segment records against the parameter table.
    pub fn resolve(
        records: &[SegmentRecord],
        codes: TopologyCodes,
        table: &WaterbodyTable,
        policy: UnknownWaterbodyPolicy,
    ) -> NetworkResult<Self> {
        let mut crosswalk = BTreeMap::new();
        let mut members: BTreeMap<WaterbodyId, Vec<LinkId>> = BTreeMap::new();

        for rec in records {
            let Some(waterbody) = rec.waterbody(codes) else {
                continue;
            };
            if !table.contains(waterbody) {
                match policy {
                    UnknownWaterbodyPolicy::Error => {
                        return Err(NetworkError::UnknownWaterbody {
                            segment: rec.id,
                            waterbody,
                        });
                    }
                    UnknownWaterbodyPolicy::DegradeToSegment => {
                        warn!(
                            segment = %rec.id,
                            waterbody = %waterbody,
                            "waterbody id missing from parameter table, routing as plain segment"
                        );
                        continue;
                    }
                }
            }
            crosswalk.insert(rec.id, waterbody);
            members.entry(waterbody).or_default().push(rec.id);
        }

        Ok(Self { crosswalk, members })
    }

    /// Segment -> waterbody crosswalk over member segments.
    pub fn crosswalk(&self) -> &BTreeMap<LinkId, WaterbodyId> {
        &self.crosswalk
    }

    /// Member segments of `waterbody` in table order.
    pub fn members(&self, waterbody: WaterbodyId) -> &[LinkId] {
        self.members
            .get(&waterbody)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn waterbody_of(&self, segment: LinkId) -> Option<WaterbodyId> {
        self.crosswalk.get(&segment).copied()
    }

    pub fn waterbody_ids(&self) -> impl Iterator<Item = WaterbodyId> + '_ {
        self.members.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.crosswalk.is_empty()
    }

    /// Collapse every waterbody's member segments into one node keyed by
    /// the waterbody id ("network breaking").
    ///
    /// The collapsed node inherits the union of the members' external
    /// upstream links; its downstream is the downstream of the single
    /// outflow segment. Intra-waterbody edges disappear. With no members
    /// resolved this is a no-op and the graph comes back unchanged.
    ///
    /// Collapsing members that are not contiguous along a chain can close
    /// a loop through the intervening segments, so the broken graph is
    /// re-checked for cycles before it is returned.
    pub fn break_network(&self, graph: &NetworkGraph) -> NetworkResult<NetworkGraph> {
        if self.is_empty() {
            return Ok(graph.clone());
        }

        let map_node = |id: LinkId| -> LinkId {
            self.crosswalk
                .get(&id)
                .map(|wb| wb.as_link())
                .unwrap_or(id)
        };

        let mut order: Vec<LinkId> = Vec::with_capacity(graph.len());
        let mut seen: HashSet<LinkId> = HashSet::with_capacity(graph.len());
        for &id in graph.link_ids() {
            let node = map_node(id);
            if seen.insert(node) {
                order.push(node);
            }
        }

        // Collect each collapsed node's external downstream targets.
        let mut targets: HashMap<LinkId, Vec<LinkId>> = HashMap::with_capacity(order.len());
        for &node in &order {
            targets.insert(node, Vec::new());
        }
        for &id in graph.link_ids() {
            let src = map_node(id);
            let Some(downstream) = graph.downstream(id) else {
                continue;
            };
            let dst = map_node(downstream);
            if src == dst {
                continue;
            }
            let out = targets.get_mut(&src).expect("node in order");
            if !out.contains(&dst) {
                out.push(dst);
            }
        }

        let mut connections: HashMap<LinkId, Vec<LinkId>> = HashMap::with_capacity(order.len());
        for &node in &order {
            let out = &targets[&node];
            if out.len() > 1 {
                if let Some(&waterbody) = self.members.keys().find(|wb| wb.as_link() == node) {
                    return Err(NetworkError::WaterbodyMultipleOutflows {
                        waterbody,
                        targets: out.clone(),
                    });
                }
            }
            connections.insert(node, out.first().copied().into_iter().collect());
        }

        crate::builder::detect_cycles(&order, &connections)?;

        let mut rconn: HashMap<LinkId, Vec<LinkId>> = HashMap::with_capacity(order.len());
        for &node in &order {
            rconn.insert(node, Vec::new());
        }
        for &node in &order {
            if let Some(&downstream) = connections[&node].first() {
                rconn.get_mut(&downstream).expect("target in order").push(node);
            }
        }

        let outlets: Vec<LinkId> = order
            .iter()
            .copied()
            .filter(|node| connections[node].is_empty())
            .collect();

        debug!(
            links = order.len(),
            waterbodies = self.members.len(),
            "network broken at waterbody boundaries"
        );

        Ok(NetworkGraph {
            order,
            connections,
            rconn,
            outlets,
        })
    }
}
