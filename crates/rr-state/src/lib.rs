//! rr-state: initial-condition handling for routing runs.
//!
//! Covers cold starts, lite-restart checkpoints, and warm-state
//! alignment against the current network domain.

pub mod checkpoint;
pub mod error;
pub mod warm;

// Re-exports for ergonomics
pub use checkpoint::{Checkpoint, FlowRecord, LastObsRecord, WaterbodyRecord};
pub use error::{StateError, StateResult};
pub use warm::{LastObs, SegmentState, WarmState, WaterbodyState};
