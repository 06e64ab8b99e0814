//! rr-core: stable foundation for riverroute.
//!
//! Contains:
//! - ids (typed keys for links, waterbodies, and gages)
//! - time (model clock and timestamp arithmetic)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod time;

// Re-exports: nice ergonomics for downstream crates
pub use error::{ensure_finite, RrError, RrResult};
pub use ids::*;
pub use time::*;
