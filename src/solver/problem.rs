use crate::error::{ModelError, Result};
use std::collections::BTreeMap;

/// A linear impulse-response problem: which variables the solver chooses,
/// which residuals it zeroes and which exogenous paths move.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseProblem {
    pub unknowns: Vec<String>,
    pub targets: Vec<String>,
    /// Deviations from steady state, each of length `horizon`.
    pub shocks: BTreeMap<String, Vec<f64>>,
    pub horizon: usize,
}

impl ImpulseProblem {
    pub fn new(unknowns: &[&str], targets: &[&str], horizon: usize) -> Self {
        Self {
            unknowns: unknowns.iter().map(|s| s.to_string()).collect(),
            targets: targets.iter().map(|s| s.to_string()).collect(),
            shocks: BTreeMap::new(),
            horizon,
        }
    }

    pub fn with_shock(mut self, name: impl Into<String>, path: Vec<f64>) -> Self {
        self.shocks.insert(name.into(), path);
        self
    }

    /// A shock of `size` in periods `0..length`, zero afterwards.
    pub fn with_pulse(self, name: impl Into<String>, size: f64, length: usize) -> Self {
        let path = (0..self.horizon).map(|t| if t < length { size } else { 0.0 }).collect();
        self.with_shock(name, path)
    }

    pub fn check_square(&self) -> Result<()> {
        if self.unknowns.len() != self.targets.len() {
            return Err(ModelError::UnknownTargetMismatch {
                unknowns: self.unknowns.len(),
                targets: self.targets.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_is_truncated_to_horizon() {
        let p = ImpulseProblem::new(&["theta"], &["asset_mkt"], 5).with_pulse("UI_extend", 0.2, 8);
        assert_eq!(p.shocks["UI_extend"], vec![0.2; 5]);
        let p = ImpulseProblem::new(&["theta"], &["asset_mkt"], 5).with_pulse("tau", -0.02, 2);
        assert_eq!(p.shocks["tau"], vec![-0.02, -0.02, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_mismatched_counts_are_rejected() {
        let p = ImpulseProblem::new(&["theta", "r_ante"], &["asset_mkt"], 5);
        assert!(matches!(p.check_square(), Err(ModelError::UnknownTargetMismatch { unknowns: 2, targets: 1 })));
    }
}
