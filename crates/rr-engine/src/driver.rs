//! Outer simulation loop driver.
//!
//! Joins the execution plan, the per-loop window sets, and the warm
//! state, then walks the loops: dispatch, merge, repeat. The caller
//! supplies the kernel factory and an abort policy for per-sub-network
//! failures.

use std::path::Path;

use rr_core::ModelClock;
use rr_forcing::{DaSet, RunSet};
use rr_state::WarmState;
use tracing::{info, info_span};

use crate::dispatch::{merge_outcome, run_loop, LoopOutcome};
use crate::error::{EngineError, EngineResult};
use crate::kernel::{LoopWindow, RoutingKernel};
use crate::plan::ExecutionPlan;

/// What to do when one or more sub-networks fail inside a loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop after the failing loop, reporting the first failure.
    #[default]
    Abort,
    /// Keep going; failed sub-networks carry their previous state.
    Continue,
}

/// Per-loop report handed back to the caller.
#[derive(Debug)]
pub struct RunReport {
    pub loops: Vec<LoopOutcome>,
}

pub struct RunDriver<'a> {
    pub plan: &'a ExecutionPlan,
    pub run_sets: &'a [RunSet],
    pub da_sets: &'a [DaSet],
    pub dt_s: u32,
    /// Worker threads for across-network dispatch. Zero uses the global
    /// rayon pool.
    pub workers: usize,
    pub policy: FailurePolicy,
    /// Checkpoint write-out destination, if any.
    pub checkpoint_out: Option<&'a Path>,
}

impl RunDriver<'_> {
    /// Walk every loop, threading state forward.
    ///
    /// `warm` is updated in place: after a successful run it holds the
    /// end-of-run state and is what gets checkpointed.
    pub fn run<K, F>(&self, warm: &mut WarmState, make_kernel: F) -> EngineResult<RunReport>
    where
        K: RoutingKernel,
        F: Fn() -> K + Sync,
    {
        if self.workers == 0 {
            return self.run_loops(warm, &make_kernel);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?;
        pool.install(|| self.run_loops(warm, &make_kernel))
    }

    fn run_loops<K, F>(&self, warm: &mut WarmState, make_kernel: &F) -> EngineResult<RunReport>
    where
        K: RoutingKernel,
        F: Fn() -> K + Sync,
    {
        let mut loops = Vec::with_capacity(self.run_sets.len());
        for (i, run_set) in self.run_sets.iter().enumerate() {
            let span = info_span!("loop", index = i, nts = run_set.nts);
            let _guard = span.enter();

            let window = LoopWindow {
                run_set,
                da_set: self.da_sets.get(i),
                clock: ModelClock::new(warm.t0, self.dt_s)?,
            };
            let outcome = run_loop(self.plan, warm, &window, &make_kernel);
            merge_outcome(warm, &outcome);
            warm.t0 = run_set.final_timestamp;

            let failed = !outcome.all_succeeded();
            loops.push(outcome);
            if failed && self.policy == FailurePolicy::Abort {
                let failure = loops
                    .last()
                    .and_then(|o| o.failures.first())
                    .map(|f| (f.tailwater, f.message.clone()));
                if let Some((outlet, message)) = failure {
                    return Err(EngineError::Kernel { outlet, message });
                }
            }
        }

        if let Some(path) = self.checkpoint_out {
            warm.to_checkpoint().write(path)?;
            info!(path = %path.display(), "checkpoint written");
        }

        info!(loops = loops.len(), "run complete");
        Ok(RunReport { loops })
    }
}
