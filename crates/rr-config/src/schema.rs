//! Run configuration schema.
//!
//! One YAML document drives a run. The layout follows the operational
//! split: network parameters (topology + waterbodies), compute
//! parameters (clock, workers, forcing, restart, data assimilation),
//! and output parameters (checkpoint write-out, parity checking).

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub network: NetworkConfig,
    pub compute: ComputeConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    pub topology: TopologySource,
    /// Sentinel meaning "no downstream segment".
    #[serde(default = "default_terminal_code")]
    pub terminal_code: i64,
    /// Sentinel meaning "not part of a waterbody".
    #[serde(default)]
    pub waterbody_null_code: i64,
    #[serde(default)]
    pub waterbodies: WaterbodyConfig,
}

/// Where the segment table comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "format")]
pub enum TopologySource {
    /// Legacy flat route-link table.
    LegacyTable { path: PathBuf },
    /// Hydrofabric flowpath feature table.
    Hydrofabric { path: PathBuf },
}

impl TopologySource {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::LegacyTable { path } | Self::Hydrofabric { path } => path,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WaterbodyConfig {
    /// Break the network at waterbody boundaries.
    #[serde(default)]
    pub break_network: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_table: Option<PathBuf>,
    /// Route segments with an unknown waterbody id as plain channels
    /// instead of failing. Off by default.
    #[serde(default)]
    pub degrade_unknown_to_segment: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComputeConfig {
    /// Model start time, e.g. "2021-08-23T13:00:00".
    pub t0: NaiveDateTime,
    /// Total routing steps requested.
    pub nts: u64,
    /// Routing timestep in seconds.
    pub dt_s: u32,
    /// Routing substeps per forcing timestep.
    pub qts_subdivisions: u32,
    /// Step budget per outer loop. Zero means a single loop.
    #[serde(default)]
    pub max_loop_steps: u64,
    /// Worker threads for across-network dispatch. Zero uses the global
    /// pool.
    #[serde(default)]
    pub workers: usize,
    pub forcing: ForcingConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart: Option<RestartConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_assimilation: Option<DaConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForcingConfig {
    pub folder: PathBuf,
    /// Glob over file names, e.g. "*.CHRTOUT_DOMAIN1".
    pub pattern: String,
    /// Forcing timesteps per file.
    #[serde(default = "default_steps_per_file")]
    pub steps_per_file: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestartConfig {
    pub checkpoint: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaConfig {
    pub obs_folder: PathBuf,
    pub obs_pattern: String,
    /// Gage id -> segment id carrying that gage.
    #[serde(default)]
    pub gage_crosswalk: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Where to write the end-of-run checkpoint. None disables
    /// write-out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parity: Option<ParityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParityConfig {
    pub folder: PathBuf,
    pub pattern: String,
}

fn default_terminal_code() -> i64 {
    -999
}

fn default_steps_per_file() -> u64 {
    1
}
