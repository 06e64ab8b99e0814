//! Routing-kernel capability interface.
//!
//! The hydraulic solve lives outside this crate. A kernel exposes four
//! capabilities and nothing else: seed it, advance it over one window,
//! read its state, overwrite its state. Exactly one kernel type exists
//! per deployment, so the trait stays narrow by construction.

use std::collections::BTreeMap;

use rr_core::{GageId, LinkId, ModelClock, WaterbodyId};
use rr_forcing::{DaSet, RunSet};
use rr_state::{LastObs, SegmentState, WaterbodyState};

use crate::error::EngineResult;
use crate::plan::SubnetworkPlan;

/// Hydraulic state of one sub-network at a loop boundary.
///
/// Constructed by `initialize`, exclusively mutated by `advance`, read
/// by callers through `get_state`, replaced wholesale by `set_state`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KernelState {
    pub segments: BTreeMap<LinkId, SegmentState>,
    pub waterbodies: BTreeMap<WaterbodyId, WaterbodyState>,
    pub lastobs: BTreeMap<GageId, LastObs>,
}

/// One outer loop's worth of inputs for a kernel.
#[derive(Clone, Debug)]
pub struct LoopWindow<'a> {
    pub run_set: &'a RunSet,
    pub da_set: Option<&'a DaSet>,
    /// Clock anchored at this window's start.
    pub clock: ModelClock,
}

impl LoopWindow<'_> {
    /// Model time this window ends at, by step arithmetic.
    pub fn end_time(&self) -> chrono::NaiveDateTime {
        self.clock.timestamp_at(self.run_set.nts)
    }
}

pub trait RoutingKernel {
    /// Seed the kernel for one sub-network from the warm state slice.
    fn initialize(&mut self, plan: &SubnetworkPlan, state: &KernelState) -> EngineResult<()>;

    /// Route one window. Reaches must be solved in plan order.
    fn advance(&mut self, window: &LoopWindow<'_>) -> EngineResult<()>;

    /// Snapshot the current state.
    fn get_state(&self) -> KernelState;

    /// Overwrite the current state.
    fn set_state(&mut self, state: &KernelState) -> EngineResult<()>;
}
