//! Defines the error types for the validation module.

/// The specific category of a validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorType {
    /// A target residual that no block produces.
    UnproducedTarget,
    /// An unknown that is missing from the steady state or already produced by a block.
    InvalidUnknown,
    /// A shock path of the wrong length, or on a variable a block produces.
    InvalidShock,
    /// A block input or parameter shift with no steady-state value.
    MissingSteadyState,
    /// A precomputed Jacobian whose horizon differs from the problem's.
    HorizonMismatch,
}

/// A structured error report from the pre-solve checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The variable or block the error is about.
    pub subject: String,
    /// The category of the error.
    pub error_type: ValidationErrorType,
    /// A human-readable message explaining the error.
    pub message: String,
}
