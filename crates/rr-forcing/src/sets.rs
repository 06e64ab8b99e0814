//! Run/DA/parity set construction.
//!
//! One triple of sets per outer simulation loop: forcing files to route
//! with, observation files to assimilate, validation files to compare
//! against. All three builders are pure functions of sorted file lists,
//! so repeated invocation with identical inputs is byte-identical.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::{ForcingError, ForcingResult};
use crate::files::file_timestamp;

/// Window-builder knobs for one forcing source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowConfig {
    /// Native forcing timesteps stored in each file.
    pub steps_per_file: u64,
    /// Routing steps per native forcing timestep.
    pub qts_subdivisions: u64,
    /// Per-loop routing-step budget. Zero means a single loop takes
    /// everything.
    pub max_loop_steps: u64,
}

impl WindowConfig {
    /// Routing steps contributed by one forcing file.
    pub fn steps_for_one_file(&self) -> u64 {
        self.steps_per_file * self.qts_subdivisions
    }
}

/// Forcing files and step budget for one outer simulation loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSet {
    pub files: Vec<String>,
    pub nts: u64,
    pub final_timestamp: NaiveDateTime,
}

/// Observation files aligned to the same window as the run set of the
/// same index. Empty is valid: DA degrades to open loop for that window.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DaSet {
    pub obs_files: Vec<String>,
}

/// Validation files aligned 1:1 by index with a run set, carrying that
/// run set's step count and final timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParitySet {
    pub validation_files: Vec<String>,
    pub nts: u64,
    pub final_timestamp: NaiveDateTime,
}

/// Group forcing files into per-loop run sets.
///
/// `files` must be lexically sorted (the timestamp-prefixed naming
/// convention makes lexical order chronological). Files stamped at or
/// before `t0` belong to an earlier simulation and are skipped. Batches
/// accumulate whole files until the per-loop budget would be exceeded,
/// and the final batch's step count is truncated so the total equals
/// `nts` exactly. A non-zero budget smaller than one file's contribution
/// is rejected, and running out of files before `nts` steps are covered
/// is a coverage error.
pub fn build_run_sets(
    config: &WindowConfig,
    files: &[String],
    t0: NaiveDateTime,
    nts: u64,
) -> ForcingResult<Vec<RunSet>> {
    let per_file = config.steps_for_one_file();
    if per_file == 0 || nts == 0 {
        return Err(ForcingError::InsufficientForcing {
            requested: nts,
            covered: 0,
        });
    }
    let files_per_loop = if config.max_loop_steps == 0 {
        usize::MAX
    } else if config.max_loop_steps < per_file {
        return Err(ForcingError::LoopBudgetTooSmall {
            max_loop_steps: config.max_loop_steps,
            steps_per_file: per_file,
        });
    } else {
        (config.max_loop_steps / per_file) as usize
    };

    let mut pending: Vec<(String, NaiveDateTime)> = Vec::with_capacity(files.len());
    for file in files {
        let stamp = file_timestamp(file)?;
        if stamp > t0 {
            pending.push((file.clone(), stamp));
        }
    }

    let mut run_sets = Vec::new();
    let mut remaining = nts;
    let mut cursor = 0usize;
    while remaining > 0 && cursor < pending.len() {
        let wanted = (remaining.div_ceil(per_file) as usize).min(files_per_loop);
        let take = wanted.min(pending.len() - cursor);
        let batch = &pending[cursor..cursor + take];
        cursor += take;

        let covered = (take as u64 * per_file).min(remaining);
        remaining -= covered;
        run_sets.push(RunSet {
            files: batch.iter().map(|(name, _)| name.clone()).collect(),
            nts: covered,
            final_timestamp: batch.last().expect("batch is non-empty").1,
        });
    }

    if remaining > 0 {
        return Err(ForcingError::InsufficientForcing {
            requested: nts,
            covered: nts - remaining,
        });
    }

    debug!(loops = run_sets.len(), nts, "run sets built");
    Ok(run_sets)
}

/// Slice observation files into windows matching `run_sets` by time.
///
/// Window `i` spans `(start_i, final_timestamp_i]` where `start_0 = t0`
/// and later windows start at the previous final timestamp. A window
/// with no observations yields an empty set.
pub fn build_da_sets(
    run_sets: &[RunSet],
    obs_files: &[String],
    t0: NaiveDateTime,
) -> ForcingResult<Vec<DaSet>> {
    let mut stamped: Vec<(String, NaiveDateTime)> = Vec::with_capacity(obs_files.len());
    for file in obs_files {
        stamped.push((file.clone(), file_timestamp(file)?));
    }

    let mut da_sets = Vec::with_capacity(run_sets.len());
    let mut window_start = t0;
    for run_set in run_sets {
        let obs = stamped
            .iter()
            .filter(|(_, stamp)| *stamp > window_start && *stamp <= run_set.final_timestamp)
            .map(|(name, _)| name.clone())
            .collect();
        da_sets.push(DaSet { obs_files: obs });
        window_start = run_set.final_timestamp;
    }
    Ok(da_sets)
}

/// Slice validation files into windows matching `run_sets`, copying each
/// matched run set's step count and duration onto the parity entry.
pub fn build_parity_sets(
    run_sets: &[RunSet],
    validation_files: &[String],
    t0: NaiveDateTime,
) -> ForcingResult<Vec<ParitySet>> {
    let mut stamped: Vec<(String, NaiveDateTime)> = Vec::with_capacity(validation_files.len());
    for file in validation_files {
        stamped.push((file.clone(), file_timestamp(file)?));
    }

    let mut parity_sets = Vec::with_capacity(run_sets.len());
    let mut window_start = t0;
    for run_set in run_sets {
        let files = stamped
            .iter()
            .filter(|(_, stamp)| *stamp > window_start && *stamp <= run_set.final_timestamp)
            .map(|(name, _)| name.clone())
            .collect();
        parity_sets.push(ParitySet {
            validation_files: files,
            nts: run_set.nts,
            final_timestamp: run_set.final_timestamp,
        });
        window_start = run_set.final_timestamp;
    }
    Ok(parity_sets)
}
