//! Execution-plan assembly.
//!
//! A plan joins the partitioner's ordered reach sequences with the
//! static hydraulic parameters each reach needs, one sub-plan per
//! tailwater. Sub-plans share nothing mutable and are handed to
//! workers independently.

use std::collections::BTreeMap;

use rr_core::{LinkId, WaterbodyId};
use rr_network::{NetworkPartition, Reach, SegmentRecord, WaterbodyParams, WaterbodyTable};
use tracing::info;

/// Static channel parameters of one segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentParams {
    pub length_m: f64,
}

/// Everything one worker needs to route one sub-network.
#[derive(Clone, Debug, PartialEq)]
pub struct SubnetworkPlan {
    pub tailwater: LinkId,
    /// Reaches in solve order. The order is a hard precondition: a
    /// reach may only be solved after every reach upstream of it.
    pub reaches: Vec<Reach>,
    pub segments: BTreeMap<LinkId, SegmentParams>,
    pub waterbodies: BTreeMap<WaterbodyId, WaterbodyParams>,
}

impl SubnetworkPlan {
    pub fn len(&self) -> usize {
        self.reaches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reaches.is_empty()
    }
}

/// The full per-run execution plan.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionPlan {
    pub subnetworks: Vec<SubnetworkPlan>,
}

impl ExecutionPlan {
    /// Join partition output with segment and waterbody parameters.
    pub fn assemble(
        partition: &NetworkPartition,
        records: &[SegmentRecord],
        table: &WaterbodyTable,
    ) -> Self {
        let params: BTreeMap<LinkId, SegmentParams> = records
            .iter()
            .map(|rec| {
                (
                    rec.id,
                    SegmentParams {
                        length_m: rec.length_m,
                    },
                )
            })
            .collect();

        let mut subnetworks = Vec::with_capacity(partition.reaches_by_tailwater().len());
        for (&tailwater, reaches) in partition.reaches_by_tailwater() {
            let mut segments = BTreeMap::new();
            let mut waterbodies = BTreeMap::new();
            for reach in reaches {
                match reach {
                    Reach::Segment(id) => {
                        if let Some(&p) = params.get(id) {
                            segments.insert(*id, p);
                        }
                    }
                    Reach::Waterbody { id, members } => {
                        if let Some(&p) = table.get(*id) {
                            waterbodies.insert(*id, p);
                        }
                        for member in members {
                            if let Some(&p) = params.get(member) {
                                segments.insert(*member, p);
                            }
                        }
                    }
                }
            }
            subnetworks.push(SubnetworkPlan {
                tailwater,
                reaches: reaches.clone(),
                segments,
                waterbodies,
            });
        }

        info!(
            subnetworks = subnetworks.len(),
            reaches = subnetworks.iter().map(SubnetworkPlan::len).sum::<usize>(),
            "execution plan assembled"
        );
        Self { subnetworks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rr_network::{NetworkBuilder, TopologyCodes, UnknownWaterbodyPolicy, WaterbodyNetwork};

    #[test]
    fn plan_carries_parameters_for_every_reach() {
        let codes = TopologyCodes::default();
        let records = vec![
            SegmentRecord::new(1, 3, 500.0, 0),
            SegmentRecord::new(2, 3, 400.0, 0),
            SegmentRecord::new(3, -999, 600.0, 0),
            SegmentRecord::new(10, -999, 700.0, 0),
        ];
        let mut builder = NetworkBuilder::new(codes);
        builder.extend_segments(records.iter().copied());
        let graph = builder.build().unwrap();

        let table = WaterbodyTable::new();
        let wbodies =
            WaterbodyNetwork::resolve(&records, codes, &table, UnknownWaterbodyPolicy::Error)
                .unwrap();
        let partition = NetworkPartition::build(&graph, &wbodies);

        let plan = ExecutionPlan::assemble(&partition, &records, &table);
        assert_eq!(plan.subnetworks.len(), 2);
        let by_tw: BTreeMap<LinkId, &SubnetworkPlan> = plan
            .subnetworks
            .iter()
            .map(|sub| (sub.tailwater, sub))
            .collect();
        assert_eq!(by_tw[&LinkId(3)].segments.len(), 3);
        assert_eq!(by_tw[&LinkId(3)].segments[&LinkId(2)].length_m, 400.0);
        assert_eq!(by_tw[&LinkId(10)].segments.len(), 1);
    }
}
