//! The central validator that runs every pre-solve rule.
use super::error::ValidationError;
use super::rules::{pairing, steady_state};
use crate::graph::Model;
use crate::solver::ImpulseProblem;
use crate::store::SteadyState;

/// Checks a model, its steady state and an impulse problem before any
/// linearization happens.
///
/// Like a linter, it collects every problem it finds rather than stopping at
/// the first one.
pub struct Validator<'a> {
    model: &'a Model,
    ss: &'a SteadyState,
    problem: &'a ImpulseProblem,
}

impl<'a> Validator<'a> {
    pub fn new(model: &'a Model, ss: &'a SteadyState, problem: &'a ImpulseProblem) -> Self {
        Self { model, ss, problem }
    }

    /// # Returns
    /// - `Ok(())` if no validation errors are found.
    /// - `Err(Vec<ValidationError>)` containing all errors discovered.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        errors.extend(pairing::validate_targets(self.model, self.problem));
        errors.extend(pairing::validate_unknowns(self.model, self.ss, self.problem));
        errors.extend(pairing::validate_shocks(self.model, self.problem));

        for block in self.model.ordered() {
            errors.extend(steady_state::validate_inputs(block, self.ss));
            if let Some(err) = steady_state::validate_horizon(block, self.problem.horizon) {
                errors.push(err);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
