//! Warm-state construction.
//!
//! A run starts either cold (everything at rest) or warm from a
//! checkpoint. Warm loading aligns the checkpoint to the current
//! domain: segments added since the checkpoint start from zero,
//! segments dropped from the domain are ignored, and a checkpoint that
//! shares no segment with the domain is rejected outright.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rr_core::{GageId, LinkId, WaterbodyId};
use rr_network::{NetworkGraph, WaterbodyTable};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::checkpoint::Checkpoint;
use crate::error::{StateError, StateResult};

/// Hydraulic state of one segment at the restart instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentState {
    pub upstream_flow_cms: f64,
    pub downstream_flow_cms: f64,
    pub depth_m: f64,
}

/// State of one waterbody at the restart instant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaterbodyState {
    pub elevation_m: f64,
    pub outflow_cms: f64,
}

/// Most recent observation seen at a gage, carried across restarts so
/// data assimilation decay continues rather than resetting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LastObs {
    pub time_since_s: f64,
    pub discharge_cms: f64,
}

/// Complete initial state for a run.
#[derive(Clone, Debug, PartialEq)]
pub struct WarmState {
    pub t0: NaiveDateTime,
    pub q0: BTreeMap<LinkId, SegmentState>,
    pub waterbodies: BTreeMap<WaterbodyId, WaterbodyState>,
    pub lastobs: BTreeMap<GageId, LastObs>,
}

impl WarmState {
    /// Everything at rest: zero flow and depth on every segment, every
    /// waterbody at its parameterized initial elevation.
    pub fn cold_start(t0: NaiveDateTime, graph: &NetworkGraph, table: &WaterbodyTable) -> Self {
        let q0 = graph
            .link_ids()
            .iter()
            .map(|&link| (link, SegmentState::default()))
            .collect();
        let waterbodies = table
            .ids()
            .filter_map(|id| {
                table.get(id).map(|params| {
                    (
                        id,
                        WaterbodyState {
                            elevation_m: params.initial_elevation_m,
                            outflow_cms: 0.0,
                        },
                    )
                })
            })
            .collect();
        Self {
            t0,
            q0,
            waterbodies,
            lastobs: BTreeMap::new(),
        }
    }

    /// Restore from a checkpoint, aligned to the current domain.
    pub fn from_checkpoint(
        checkpoint: &Checkpoint,
        graph: &NetworkGraph,
        table: &WaterbodyTable,
    ) -> StateResult<Self> {
        let restored: BTreeMap<LinkId, SegmentState> = checkpoint
            .flows
            .iter()
            .filter(|rec| graph.contains(rec.segment))
            .map(|rec| {
                (
                    rec.segment,
                    SegmentState {
                        upstream_flow_cms: rec.upstream_flow_cms,
                        downstream_flow_cms: rec.downstream_flow_cms,
                        depth_m: rec.depth_m,
                    },
                )
            })
            .collect();

        if restored.is_empty() && !checkpoint.flows.is_empty() {
            return Err(StateError::DomainMismatch {
                checkpoint_segments: checkpoint.flows.len(),
                domain_segments: graph.len(),
            });
        }

        let mut q0 = restored;
        let mut zero_filled = 0_usize;
        for &link in graph.link_ids() {
            q0.entry(link).or_insert_with(|| {
                zero_filled += 1;
                SegmentState::default()
            });
        }
        if zero_filled > 0 {
            warn!(
                segments = zero_filled,
                "segments absent from checkpoint start from zero state"
            );
        }

        let from_checkpoint: BTreeMap<WaterbodyId, WaterbodyState> = checkpoint
            .waterbodies
            .iter()
            .filter(|rec| table.contains(rec.waterbody))
            .map(|rec| {
                (
                    rec.waterbody,
                    WaterbodyState {
                        elevation_m: rec.elevation_m,
                        outflow_cms: rec.outflow_cms,
                    },
                )
            })
            .collect();
        let mut waterbodies = from_checkpoint;
        for id in table.ids() {
            if let Some(params) = table.get(id) {
                waterbodies.entry(id).or_insert(WaterbodyState {
                    elevation_m: params.initial_elevation_m,
                    outflow_cms: 0.0,
                });
            }
        }

        let lastobs = checkpoint
            .lastobs
            .iter()
            .map(|rec| {
                (
                    rec.gage.clone(),
                    LastObs {
                        time_since_s: rec.time_since_s,
                        discharge_cms: rec.discharge_cms,
                    },
                )
            })
            .collect();

        info!(
            t0 = %checkpoint.time,
            segments = q0.len(),
            waterbodies = waterbodies.len(),
            "warm state restored from checkpoint"
        );

        Ok(Self {
            t0: checkpoint.time,
            q0,
            waterbodies,
            lastobs,
        })
    }

    /// Drop last-observation rows whose gage has no segment in the
    /// crosswalk. Observations without a routable segment cannot be
    /// assimilated and would otherwise ride along forever.
    pub fn align_lastobs(&mut self, crosswalk: &BTreeMap<GageId, LinkId>) {
        let before = self.lastobs.len();
        self.lastobs.retain(|gage, _| crosswalk.contains_key(gage));
        let dropped = before - self.lastobs.len();
        if dropped > 0 {
            warn!(dropped, "last observations without a gage crosswalk entry discarded");
        }
    }

    /// Capture the current state as a checkpoint blob.
    pub fn to_checkpoint(&self) -> Checkpoint {
        Checkpoint {
            time: self.t0,
            flows: self
                .q0
                .iter()
                .map(|(&segment, state)| crate::checkpoint::FlowRecord {
                    segment,
                    upstream_flow_cms: state.upstream_flow_cms,
                    downstream_flow_cms: state.downstream_flow_cms,
                    depth_m: state.depth_m,
                })
                .collect(),
            waterbodies: self
                .waterbodies
                .iter()
                .map(|(&waterbody, state)| crate::checkpoint::WaterbodyRecord {
                    waterbody,
                    elevation_m: state.elevation_m,
                    outflow_cms: state.outflow_cms,
                })
                .collect(),
            lastobs: self
                .lastobs
                .iter()
                .map(|(gage, obs)| crate::checkpoint::LastObsRecord {
                    gage: gage.clone(),
                    time_since_s: obs.time_since_s,
                    discharge_cms: obs.discharge_cms,
                })
                .collect(),
        }
    }
}
