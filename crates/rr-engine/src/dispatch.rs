//! Per-loop dispatch across independent sub-networks.
//!
//! Sub-networks share no state, so they run in parallel; within one
//! sub-network the kernel is required to honor reach order. A failure
//! in one sub-network never disturbs its siblings: failures are
//! collected into a per-tailwater report and the caller decides
//! whether the run continues.

use std::collections::BTreeMap;

use rayon::prelude::*;
use rr_core::LinkId;
use rr_network::Reach;
use rr_state::WarmState;
use tracing::{debug, warn};

use crate::kernel::{KernelState, LoopWindow, RoutingKernel};
use crate::plan::{ExecutionPlan, SubnetworkPlan};

/// One sub-network's failure, carried out of the loop without
/// aborting siblings.
#[derive(Debug)]
pub struct OutletFailure {
    pub tailwater: LinkId,
    pub message: String,
}

/// Result of one outer loop across all sub-networks.
#[derive(Debug, Default)]
pub struct LoopOutcome {
    /// End-of-loop state per tailwater, successful sub-networks only.
    pub states: BTreeMap<LinkId, KernelState>,
    pub failures: Vec<OutletFailure>,
}

impl LoopOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The slice of warm state one sub-network's kernel is seeded with.
pub fn slice_state(plan: &SubnetworkPlan, warm: &WarmState) -> KernelState {
    let mut state = KernelState::default();
    for reach in &plan.reaches {
        match reach {
            Reach::Segment(id) => {
                if let Some(&s) = warm.q0.get(id) {
                    state.segments.insert(*id, s);
                }
            }
            Reach::Waterbody { id, members } => {
                if let Some(&w) = warm.waterbodies.get(id) {
                    state.waterbodies.insert(*id, w);
                }
                for member in members {
                    if let Some(&s) = warm.q0.get(member) {
                        state.segments.insert(*member, s);
                    }
                }
            }
        }
    }
    // Gage observations are not partitioned; every kernel sees them.
    state.lastobs = warm.lastobs.clone();
    state
}

/// Run one window over every sub-network in the plan.
///
/// `make_kernel` is invoked once per sub-network so each worker owns
/// its kernel exclusively.
pub fn run_loop<K, F>(
    plan: &ExecutionPlan,
    warm: &WarmState,
    window: &LoopWindow<'_>,
    make_kernel: F,
) -> LoopOutcome
where
    K: RoutingKernel,
    F: Fn() -> K + Sync,
{
    let results: Vec<(LinkId, Result<KernelState, String>)> = plan
        .subnetworks
        .par_iter()
        .map(|sub| {
            let outcome = route_subnetwork(sub, warm, window, &make_kernel);
            (sub.tailwater, outcome)
        })
        .collect();

    let mut outcome = LoopOutcome::default();
    for (tailwater, result) in results {
        match result {
            Ok(state) => {
                debug!(%tailwater, "sub-network routed");
                outcome.states.insert(tailwater, state);
            }
            Err(message) => {
                warn!(%tailwater, %message, "sub-network failed");
                outcome.failures.push(OutletFailure { tailwater, message });
            }
        }
    }
    outcome
}

fn route_subnetwork<K, F>(
    sub: &SubnetworkPlan,
    warm: &WarmState,
    window: &LoopWindow<'_>,
    make_kernel: &F,
) -> Result<KernelState, String>
where
    K: RoutingKernel,
    F: Fn() -> K + Sync,
{
    let mut kernel = make_kernel();
    let seed = slice_state(sub, warm);
    kernel
        .initialize(sub, &seed)
        .map_err(|e| e.to_string())?;
    kernel.advance(window).map_err(|e| e.to_string())?;
    Ok(kernel.get_state())
}

/// Fold successful sub-network states back into the warm state for the
/// next loop. Failed sub-networks keep their previous state.
pub fn merge_outcome(warm: &mut WarmState, outcome: &LoopOutcome) {
    for state in outcome.states.values() {
        for (&id, &s) in &state.segments {
            warm.q0.insert(id, s);
        }
        for (&id, &w) in &state.waterbodies {
            warm.waterbodies.insert(id, w);
        }
        for (gage, obs) in &state.lastobs {
            warm.lastobs.insert(gage.clone(), obs.clone());
        }
    }
}
