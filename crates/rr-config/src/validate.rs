//! Configuration validation.
//!
//! Failures carry the dotted path of the offending field so the CLI
//! can point at the exact line of the document.

use crate::schema::{ComputeConfig, NetworkConfig, RunConfig};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing field: {field} ({reason})")]
    MissingField { field: String, reason: String },
}

pub fn validate_config(config: &RunConfig) -> Result<(), ValidationError> {
    validate_network(&config.network)?;
    validate_compute(&config.compute)?;

    if let Some(parity) = &config.output.parity {
        if parity.pattern.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "output.parity.pattern".to_string(),
                value: String::new(),
                reason: "pattern must not be empty".to_string(),
            });
        }
    }

    Ok(())
}

fn validate_network(network: &NetworkConfig) -> Result<(), ValidationError> {
    if network.terminal_code == network.waterbody_null_code {
        return Err(ValidationError::InvalidValue {
            field: "network.terminal_code".to_string(),
            value: network.terminal_code.to_string(),
            reason: "terminal and waterbody-null sentinels must differ".to_string(),
        });
    }

    if network.waterbodies.break_network && network.waterbodies.parameter_table.is_none() {
        return Err(ValidationError::MissingField {
            field: "network.waterbodies.parameter_table".to_string(),
            reason: "required when break_network is enabled".to_string(),
        });
    }

    Ok(())
}

fn validate_compute(compute: &ComputeConfig) -> Result<(), ValidationError> {
    if compute.nts == 0 {
        return Err(ValidationError::InvalidValue {
            field: "compute.nts".to_string(),
            value: "0".to_string(),
            reason: "at least one routing step is required".to_string(),
        });
    }

    if compute.dt_s == 0 {
        return Err(ValidationError::InvalidValue {
            field: "compute.dt_s".to_string(),
            value: "0".to_string(),
            reason: "timestep must be positive".to_string(),
        });
    }

    if compute.qts_subdivisions == 0 {
        return Err(ValidationError::InvalidValue {
            field: "compute.qts_subdivisions".to_string(),
            value: "0".to_string(),
            reason: "subdivision factor must be positive".to_string(),
        });
    }

    if compute.forcing.pattern.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "compute.forcing.pattern".to_string(),
            value: String::new(),
            reason: "pattern must not be empty".to_string(),
        });
    }

    if compute.forcing.steps_per_file == 0 {
        return Err(ValidationError::InvalidValue {
            field: "compute.forcing.steps_per_file".to_string(),
            value: "0".to_string(),
            reason: "each file must carry at least one timestep".to_string(),
        });
    }

    if let Some(da) = &compute.data_assimilation {
        if da.obs_pattern.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "compute.data_assimilation.obs_pattern".to_string(),
                value: String::new(),
                reason: "pattern must not be empty".to_string(),
            });
        }
    }

    Ok(())
}
