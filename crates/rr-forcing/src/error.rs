//! Error types for forcing/observation window building.

use std::path::PathBuf;

use thiserror::Error;

pub type ForcingResult<T> = Result<T, ForcingError>;

#[derive(Error, Debug)]
pub enum ForcingError {
    #[error("Failed to scan forcing folder {path}")]
    Scan {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid file pattern '{pattern}'")]
    BadPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("File name '{file}' carries no parsable timestamp")]
    BadTimestamp { file: String },

    #[error(
        "Insufficient forcing: {requested} steps requested but files cover only {covered} \
         (short by {})", .requested - .covered
    )]
    InsufficientForcing { requested: u64, covered: u64 },

    #[error(
        "Loop budget of {max_loop_steps} steps cannot fit one forcing file \
         ({steps_per_file} steps)"
    )]
    LoopBudgetTooSmall {
        max_loop_steps: u64,
        steps_per_file: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_forcing_reports_shortfall() {
        let err = ForcingError::InsufficientForcing {
            requested: 288,
            covered: 240,
        };
        let msg = format!("{err}");
        assert!(msg.contains("short by 48"), "{msg}");
    }
}
