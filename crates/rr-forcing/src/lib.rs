//! rr-forcing: time-windowing of forcing, observation, and validation
//! file sets.
//!
//! Provides:
//! - Forcing folder enumeration with glob-style filters
//! - Filename-encoded timestamp parsing
//! - Run/DA/parity set construction, one aligned triple per outer loop

pub mod error;
pub mod files;
pub mod sets;

// Re-exports for ergonomics
pub use error::{ForcingError, ForcingResult};
pub use files::{file_timestamp, list_matching_files};
pub use sets::{
    build_da_sets, build_parity_sets, build_run_sets, DaSet, ParitySet, RunSet, WindowConfig,
};
