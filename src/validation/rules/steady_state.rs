//! Rules tying blocks to the steady state they are linearized around.
use crate::graph::{BlockKind, ModelBlock};
use crate::store::SteadyState;
use crate::validation::error::{ValidationError, ValidationErrorType};

/// Every variable a block reads, and every parameter driving a shift, needs a
/// steady-state value.
pub(crate) fn validate_inputs(block: &ModelBlock, ss: &SteadyState) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut missing = |name: &str, what: &str| {
        errors.push(ValidationError {
            subject: block.name().to_string(),
            error_type: ValidationErrorType::MissingSteadyState,
            message: format!("Block '{}' {} '{}', which has no steady-state value", block.name(), what, name),
        });
    };

    match block {
        ModelBlock::Equation(b) => {
            for name in b.input_names() {
                if !ss.contains(name) {
                    missing(name, "reads");
                }
            }
            let unknown_shifts = match &b.kind {
                BlockKind::Implicit { unknown, unknown_shifts, .. } => {
                    if !ss.contains(*unknown) {
                        missing(*unknown, "solves for");
                    }
                    unknown_shifts.as_slice()
                }
                BlockKind::Explicit => &[],
            };
            let params = b.inputs.iter().map(|(_, s)| s).chain(unknown_shifts).filter_map(|s| s.param());
            for p in params {
                if !ss.contains(p) {
                    missing(p, "shifts by");
                }
            }
        }
        ModelBlock::Jacobian(j) => {
            for name in j.inputs() {
                if !ss.contains(name) {
                    missing(name, "maps");
                }
            }
        }
    }
    errors
}

pub(crate) fn validate_horizon(block: &ModelBlock, horizon: usize) -> Option<ValidationError> {
    match block {
        ModelBlock::Jacobian(j) if j.horizon() != horizon => Some(ValidationError {
            subject: j.name().to_string(),
            error_type: ValidationErrorType::HorizonMismatch,
            message: format!("Jacobian block '{}' has horizon {}, problem has {}", j.name(), j.horizon(), horizon),
        }),
        _ => None,
    }
}
