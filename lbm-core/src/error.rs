use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Setup and caller-contract failures. A running `step` never produces one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("lattice dimensions must be at least 1x1, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("failed to allocate {field} field for {cells} cells")]
    Allocation { field: &'static str, cells: usize },

    #[error("solute index {index} out of range (engine has {count} solutes)")]
    SoluteIndex { index: usize, count: usize },

    #[error("{name} must be positive and finite, got {value}")]
    InvalidCoefficient { name: &'static str, value: f32 },

    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("invalid stoichiometry: {0}")]
    InvalidStoichiometry(String),
}
