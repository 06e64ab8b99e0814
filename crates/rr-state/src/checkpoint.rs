//! Lite-restart checkpoint blob.
//!
//! The checkpoint is an opaque state capture written at the end of a
//! loop and consumed at the start of the next run: per-segment flow and
//! depth, per-waterbody level and outflow, and the last-observation
//! table that keeps data assimilation continuous across restarts.

use std::path::Path;

use chrono::NaiveDateTime;
use rr_core::{GageId, LinkId, WaterbodyId};
use serde::{Deserialize, Serialize};

use crate::error::{StateError, StateResult};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub segment: LinkId,
    /// Discharge entering the segment head, m3/s.
    pub upstream_flow_cms: f64,
    /// Discharge leaving the segment foot, m3/s.
    pub downstream_flow_cms: f64,
    /// Water depth, m.
    pub depth_m: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaterbodyRecord {
    pub waterbody: WaterbodyId,
    pub elevation_m: f64,
    pub outflow_cms: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LastObsRecord {
    pub gage: GageId,
    /// Seconds elapsed between the observation and the checkpoint time.
    pub time_since_s: f64,
    pub discharge_cms: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub time: NaiveDateTime,
    pub flows: Vec<FlowRecord>,
    pub waterbodies: Vec<WaterbodyRecord>,
    #[serde(default)]
    pub lastobs: Vec<LastObsRecord>,
}

impl Checkpoint {
    pub fn read(path: &Path) -> StateResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| StateError::CheckpointRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| StateError::CheckpointParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn write(&self, path: &Path) -> StateResult<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|source| StateError::CheckpointSerialize { source })?;
        std::fs::write(path, text).map_err(|source| StateError::CheckpointWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}
