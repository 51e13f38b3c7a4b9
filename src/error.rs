//! Crate-wide error type.
use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Steady state has no value for '{0}'")]
    MissingSteadyStateValue(String),

    #[error("No series named '{0}'")]
    MissingSeries(String),

    #[error("Transition matrix has no eigenvalue equal to 1 (spectral radius {spectral_radius:.3e})")]
    NoUnitEigenvalue { spectral_radius: f64 },

    #[error("Block '{block}' could not bracket a root in ({lo}, {hi}) at t={t}")]
    RootNotBracketed { block: String, t: usize, lo: f64, hi: f64 },

    #[error("Block '{block}' did not converge after {iterations} iterations")]
    NoConvergence { block: String, iterations: usize },

    #[error("Singular Jacobian in {context}")]
    SingularJacobian { context: String },

    #[error("Cycle detected involving block '{0}'")]
    CycleDetected(String),

    #[error("Duplicate block name '{0}'")]
    DuplicateBlock(String),

    #[error("Variable '{var}' is produced by both '{first}' and '{second}'")]
    DuplicateProducer { var: String, first: String, second: String },

    #[error("No Jacobian of '{output}' with respect to '{input}'")]
    MissingJacobian { output: String, input: String },

    #[error("Shape mismatch in {context}: expected {expected}, found {found}")]
    ShapeMismatch { context: String, expected: usize, found: usize },

    #[error("{unknowns} unknowns but {targets} targets")]
    UnknownTargetMismatch { unknowns: usize, targets: usize },

    #[error("Model validation failed with {} error(s): {}", .0.len(), summarize(.0))]
    Validation(Vec<ValidationError>),

    #[error("Invalid configuration '{field}': {reason}")]
    Config { field: String, reason: String },

    #[error("Unknown model variant '{0}'")]
    UnknownVariant(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

fn summarize(errors: &[ValidationError]) -> String {
    errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>().join("; ")
}

pub type Result<T> = std::result::Result<T, ModelError>;
