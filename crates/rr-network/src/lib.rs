//! rr-network: river network topology engine.
//!
//! Provides:
//! - Segment record ingestion with configurable sentinel codes
//! - Forward/reverse connectivity graphs with cycle rejection
//! - Waterbody membership resolution and network breaking
//! - Partitioning into independent, topologically ordered sub-networks
//!
//! # Example
//!
//! ```
//! use rr_network::{NetworkBuilder, SegmentRecord, TopologyCodes};
//!
//! let codes = TopologyCodes { terminal_code: -999, waterbody_null_code: 0 };
//! let mut builder = NetworkBuilder::new(codes);
//! builder.push_segment(SegmentRecord::new(1, 2, 456.0, 0));
//! builder.push_segment(SegmentRecord::new(2, -999, 178.0, 0));
//! let graph = builder.build().unwrap();
//!
//! assert_eq!(graph.len(), 2);
//! assert_eq!(graph.outlets().len(), 1);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod partition;
pub mod records;
pub mod waterbody;

// Re-exports for ergonomics
pub use builder::NetworkBuilder;
pub use error::{NetworkError, NetworkResult};
pub use graph::NetworkGraph;
pub use partition::{chunk_reaches, NetworkPartition, Reach};
pub use records::{SegmentRecord, TopologyCodes};
pub use waterbody::{
    UnknownWaterbodyPolicy, WaterbodyKind, WaterbodyNetwork, WaterbodyParams, WaterbodyTable,
};
