//! Error types for the power flow solver.

use thiserror::Error;

use crate::mpopt::PFOptBuilderError;
use crate::network::Bus;

/// Result type alias using [`PfError`].
pub type Result<T> = std::result::Result<T, PfError>;

#[derive(Error, Debug)]
pub enum PfError {
    // ============ Topology Errors ============
    /// Line with zero series impedance.
    #[error("line '{line}' ({from} -> {to}) has zero impedance")]
    SingularImpedance {
        line: String,
        from: String,
        to: String,
    },

    /// Line endpoint not present in the bus set.
    #[error("line '{line}' references unknown bus '{bus}'")]
    UnknownBus { line: String, bus: String },

    // ============ Model Errors ============
    #[error("duplicate bus id '{bus}'")]
    DuplicateBus { bus: String },

    #[error("slack bus ordinal {index} out of range ({nb} buses)")]
    InvalidSlack { index: usize, nb: usize },

    /// Solve requested before a network model was supplied.
    #[error("no network model: load a case before solving")]
    MissingModel,

    #[error("no power flow solution: solve before comparing")]
    MissingSolution,

    #[error("no reference result set to compare against")]
    MissingReference,

    // ============ Solver Errors ============
    /// Zero diagonal entry in the admittance matrix.
    #[error("zero self admittance at bus '{bus}' (ordinal {index}): no connected lines")]
    SingularAdmittance { index: usize, bus: String },

    /// Zero or non-finite voltage at a bus about to be updated.
    #[error("voltage at bus '{bus}' (ordinal {index}) is zero or not finite")]
    ZeroVoltage { index: usize, bus: String },

    #[error("{what} has length {found}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid solver options: {0}")]
    Options(#[from] PFOptBuilderError),
}

impl PfError {
    pub fn unknown_bus(line: impl Into<String>, bus: impl Into<String>) -> Self {
        Self::UnknownBus {
            line: line.into(),
            bus: bus.into(),
        }
    }

    /// Replaces the ordinal placeholder of solver errors with the id of
    /// the bus at that ordinal.
    pub fn with_bus_ids(self, bus: &[Bus]) -> Self {
        match self {
            Self::SingularAdmittance { index, .. } if index < bus.len() => {
                Self::SingularAdmittance {
                    index,
                    bus: bus[index].id.clone(),
                }
            }
            Self::ZeroVoltage { index, .. } if index < bus.len() => Self::ZeroVoltage {
                index,
                bus: bus[index].id.clone(),
            },
            err => err,
        }
    }
}
