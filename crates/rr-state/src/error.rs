//! Error types for checkpoint loading and warm-state construction.

use std::path::PathBuf;

use thiserror::Error;

pub type StateResult<T> = Result<T, StateError>;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to read checkpoint {path}")]
    CheckpointRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse checkpoint {path}")]
    CheckpointParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write checkpoint {path}")]
    CheckpointWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize checkpoint")]
    CheckpointSerialize { source: serde_json::Error },

    #[error(
        "Checkpoint/domain mismatch: none of the {checkpoint_segments} checkpointed segments \
         exist in the {domain_segments}-segment domain"
    )]
    DomainMismatch {
        checkpoint_segments: usize,
        domain_segments: usize,
    },
}
