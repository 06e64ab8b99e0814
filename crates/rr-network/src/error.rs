//! Network-specific error types.

use rr_core::{LinkId, WaterbodyId};
use thiserror::Error;

pub type NetworkResult<T> = Result<T, NetworkError>;

/// Topology construction and validation errors.
///
/// All of these are configuration errors: they abort the run before any
/// partitioning or routing begins.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Duplicate segment id {id} in connectivity table")]
    DuplicateSegment { id: LinkId },

    #[error("Segment {id} lists itself as its downstream segment")]
    SelfLoop { id: LinkId },

    #[error("Connectivity table contains cycles: {}", format_chains(.chains))]
    Cycles { chains: Vec<Vec<LinkId>> },

    #[error("Segment {segment} references waterbody {waterbody} absent from the parameter table")]
    UnknownWaterbody {
        segment: LinkId,
        waterbody: WaterbodyId,
    },

    #[error("Waterbody {waterbody} drains to multiple downstream targets {targets:?}")]
    WaterbodyMultipleOutflows {
        waterbody: WaterbodyId,
        targets: Vec<LinkId>,
    },

    #[error("Segment id {id} not present in the network")]
    UnknownSegment { id: LinkId },
}

fn format_chains(chains: &[Vec<LinkId>]) -> String {
    chains
        .iter()
        .map(|chain| {
            chain
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(" -> ")
        })
        .collect::<Vec<_>>()
        .join("; ")
}
