//! rr-engine: execution planning and per-loop dispatch.
//!
//! Provides:
//! - Execution-plan assembly from partition output and parameter tables
//! - The routing-kernel capability interface
//! - Parallel dispatch across independent sub-networks with per-outlet
//!   failure isolation
//! - The flattened-array host boundary

pub mod dispatch;
pub mod driver;
pub mod error;
pub mod exchange;
pub mod kernel;
pub mod plan;

// Re-exports for ergonomics
pub use dispatch::{merge_outcome, run_loop, slice_state, LoopOutcome, OutletFailure};
pub use driver::{FailurePolicy, RunDriver, RunReport};
pub use error::{EngineError, EngineResult};
pub use kernel::{KernelState, LoopWindow, RoutingKernel};
pub use plan::{ExecutionPlan, SegmentParams, SubnetworkPlan};
