// Error types for the simulator engines and the driver configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised by the pure-state, density-matrix and noise engines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Register size is zero or above what the engine can hold.
    #[error("Invalid qubit count {requested}: must be in [1, {max}]")]
    InvalidQubitCount { requested: usize, max: usize },

    /// Qubit index outside `[0, num_qubits)`.
    #[error("Invalid qubit {index}. Must be in [0, {num_qubits})")]
    QubitOutOfRange { index: usize, num_qubits: usize },

    /// Basis index outside `[0, 2^num_qubits)`.
    #[error("Basis index {index} out of range for dimension {dimension}")]
    BasisIndexOutOfRange { index: usize, dimension: usize },

    /// The same qubit was named twice in one multi-qubit gate.
    #[error("Qubit {0} used more than once in the same gate")]
    DuplicateQubit(usize),

    /// Operator shape does not match the system (or a 2x2 local operator).
    #[error("Dimension mismatch: expected {expected}x{expected}, got {rows}x{cols}")]
    DimensionMismatch {
        expected: usize,
        rows: usize,
        cols: usize,
    },

    /// Collapse would renormalize by a vanishing probability.
    #[error("Numerical instability: cannot renormalize by probability {probability:e}")]
    NumericalInstability { probability: f64 },

    /// Channel parameter outside its closed range.
    #[error("Invalid {parameter} = {value}: must lie in [0, {max}]")]
    InvalidParameter {
        parameter: &'static str,
        value: f64,
        max: f64,
    },

    /// A quantum channel needs at least one Kraus operator.
    #[error("Quantum channel must have at least one Kraus operator")]
    EmptyChannel,

    /// Malformed ket specification string.
    #[error("Invalid ket specification: {0}")]
    InvalidKet(String),

    /// Amplitude vector or matrix that cannot represent a state.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Errors raised while loading or validating a [`crate::config::SimConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid_value(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

impl From<SimError> for ConfigError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::InvalidParameter { parameter, .. } => {
                ConfigError::invalid_value(parameter, err.to_string())
            }
            other => ConfigError::invalid_value("(engine)", other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = SimError::QubitOutOfRange {
            index: 3,
            num_qubits: 2,
        };
        assert_eq!(err.to_string(), "Invalid qubit 3. Must be in [0, 2)");

        let err = SimError::InvalidParameter {
            parameter: "gamma",
            value: 1.5,
            max: 1.0,
        };
        assert_eq!(err.to_string(), "Invalid gamma = 1.5: must lie in [0, 1]");
    }

    #[test]
    fn test_config_error_from_parameter() {
        let err: ConfigError = SimError::InvalidParameter {
            parameter: "dephasing",
            value: -0.1,
            max: 1.0,
        }
        .into();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "dephasing",
                ..
            }
        ));
    }
}
