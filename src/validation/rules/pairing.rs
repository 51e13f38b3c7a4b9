//! Rules on the unknowns, targets and shocks of an impulse problem.
use crate::graph::Model;
use crate::solver::ImpulseProblem;
use crate::store::SteadyState;
use crate::validation::error::{ValidationError, ValidationErrorType};

/// Every target must be a residual some block produces.
pub(crate) fn validate_targets(model: &Model, problem: &ImpulseProblem) -> Vec<ValidationError> {
    problem
        .targets
        .iter()
        .filter(|t| !model.produces(t))
        .map(|t| ValidationError {
            subject: t.clone(),
            error_type: ValidationErrorType::UnproducedTarget,
            message: format!("Target '{}' is not produced by any block in '{}'", t, model.name()),
        })
        .collect()
}

/// Unknowns are free: they need a steady state and no producing block.
pub(crate) fn validate_unknowns(model: &Model, ss: &SteadyState, problem: &ImpulseProblem) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for u in &problem.unknowns {
        if !ss.contains(u) {
            errors.push(ValidationError {
                subject: u.clone(),
                error_type: ValidationErrorType::InvalidUnknown,
                message: format!("Unknown '{}' has no steady-state value", u),
            });
        }
        if let Some(block) = model.producer_of(u) {
            errors.push(ValidationError {
                subject: u.clone(),
                error_type: ValidationErrorType::InvalidUnknown,
                message: format!("Unknown '{}' is already produced by block '{}'", u, block.name()),
            });
        }
    }
    errors
}

/// Shocks are exogenous paths over the full horizon.
pub(crate) fn validate_shocks(model: &Model, problem: &ImpulseProblem) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (name, path) in &problem.shocks {
        if path.len() != problem.horizon {
            errors.push(ValidationError {
                subject: name.clone(),
                error_type: ValidationErrorType::InvalidShock,
                message: format!("Shock '{}' has length {}, expected {}", name, path.len(), problem.horizon),
            });
        }
        if let Some(block) = model.producer_of(name) {
            errors.push(ValidationError {
                subject: name.clone(),
                error_type: ValidationErrorType::InvalidShock,
                message: format!("Shock '{}' is produced by block '{}'", name, block.name()),
            });
        }
    }
    errors
}
