//! Response of the employment distribution to a one-period change in the
//! job-finding probability.
use super::labor::{transition_matrix, NUM_STATES};
use super::params::check_step;
use crate::error::{ModelError, Result};
use crate::graph::{JacobianBlock, JacobianDict};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::debug;

pub const DEFAULT_STEP: f64 = 1e-4;

/// Names the block gives to the six states, in matrix order.
const STATE_OUTPUTS: [&str; NUM_STATES] = ["N", "U1", "U2", "U3", "U4", "U5"];

/// `jac[state]` is a T x T matrix indexed `[response_t, shock_s]`.
#[derive(Debug, Clone)]
pub struct UnemploymentJacobian {
    horizon: usize,
    jac: Vec<DMatrix<f64>>,
}

/// Raw deviation of the distribution from `stationary` when `perturbed`
/// replaces `base` at `shock_time` only. Column `t` holds the state after
/// the period-`t` transition.
pub fn column_deviation(
    base: &DMatrix<f64>,
    perturbed: &DMatrix<f64>,
    stationary: &DVector<f64>,
    shock_time: usize,
    horizon: usize,
) -> DMatrix<f64> {
    let mut out = DMatrix::zeros(stationary.len(), horizon);
    let mut dist = stationary.clone();
    for t in 0..horizon {
        dist = if t == shock_time { perturbed * &dist } else { base * &dist };
        out.set_column(t, &(&dist - stationary));
    }
    out
}

pub fn unemployment_jacobian(
    job_find: f64,
    job_sep: f64,
    stationary: &DVector<f64>,
    horizon: usize,
    step: f64,
) -> Result<UnemploymentJacobian> {
    check_step("ujac_step", step)?;
    if stationary.len() != NUM_STATES {
        return Err(ModelError::ShapeMismatch {
            context: "stationary distribution".into(),
            expected: NUM_STATES,
            found: stationary.len(),
        });
    }
    let start = Instant::now();
    let base = transition_matrix(job_find, job_sep);
    let perturbed = transition_matrix(job_find + step, job_sep);

    let columns: Vec<DMatrix<f64>> = (0..horizon)
        .into_par_iter()
        .map(|s| column_deviation(&base, &perturbed, stationary, s, horizon) / step)
        .collect();

    let mut jac = vec![DMatrix::zeros(horizon, horizon); NUM_STATES];
    for (s, col) in columns.iter().enumerate() {
        for (state, m) in jac.iter_mut().enumerate() {
            for t in 0..horizon {
                m[(t, s)] = col[(state, t)];
            }
        }
    }

    debug!(horizon, step, elapsed_ms = start.elapsed().as_millis() as u64, "Built unemployment Jacobian");
    Ok(UnemploymentJacobian { horizon, jac })
}

impl UnemploymentJacobian {
    pub fn horizon(&self) -> usize { self.horizon }

    /// (states, T, T)
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.jac.len(), self.horizon, self.horizon)
    }

    pub fn state(&self, k: usize) -> Option<&DMatrix<f64>> {
        self.jac.get(k)
    }

    /// Wraps the Jacobian as block `ujac`: input `eta`, outputs `N` and `U1..U5`.
    pub fn to_block(&self) -> Result<JacobianBlock> {
        let mut dict = JacobianDict::new();
        for (name, m) in STATE_OUTPUTS.iter().zip(&self.jac) {
            let mut row = BTreeMap::new();
            row.insert("eta".to_string(), m.clone());
            dict.insert(name.to_string(), row);
        }
        JacobianBlock::new("ujac", dict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::LaborMarket;
    use rstest::rstest;

    fn labor() -> LaborMarket {
        LaborMarket::calibrate(2.0 / 3.0, 0.0306834).unwrap()
    }

    #[test]
    fn test_shape_and_block_wiring() {
        let lm = labor();
        let ujac = unemployment_jacobian(lm.job_find, lm.job_sep, &lm.stationary, 12, DEFAULT_STEP).unwrap();
        assert_eq!(ujac.shape(), (6, 12, 12));

        let block = ujac.to_block().unwrap();
        assert_eq!(block.name(), "ujac");
        assert_eq!(block.horizon(), 12);
        assert!(block.inputs().contains("eta"));
        assert!(block.get("N", "eta").is_some());
        assert!(block.get("U5", "eta").is_some());
    }

    #[test]
    fn test_zero_perturbation_gives_zero_deviation() {
        let lm = labor();
        let dev = column_deviation(&lm.matrix, &lm.matrix, &lm.stationary, 3, 20);
        assert!(dev.iter().all(|&x| x.abs() < 1e-14));
    }

    #[test]
    fn test_response_is_causal_and_raises_employment() {
        let lm = labor();
        let ujac = unemployment_jacobian(lm.job_find, lm.job_sep, &lm.stationary, 10, DEFAULT_STEP).unwrap();
        let n = ujac.state(0).unwrap();
        for s in 0..10 {
            for t in 0..s {
                assert!(n[(t, s)].abs() < 1e-10, "N({}) moved before the shock at {}", t, s);
            }
            assert!(n[(s, s)] > 0.0);
        }
        // Mass is conserved: the states move in opposite directions.
        for t in 0..10 {
            let total: f64 = (0..6).map(|k| ujac.state(k).unwrap()[(t, 2)]).sum();
            assert!(total.abs() < 1e-8);
        }
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1e-4)]
    #[case(f64::NAN)]
    fn test_unusable_step_is_rejected(#[case] step: f64) {
        let lm = labor();
        let err = unemployment_jacobian(lm.job_find, lm.job_sep, &lm.stationary, 5, step).unwrap_err();
        assert!(matches!(err, ModelError::Config { ref field, .. } if field == "ujac_step"), "{}", err);
    }

    #[test]
    fn test_wrong_distribution_length_is_rejected() {
        let short = DVector::from_element(4, 0.25);
        assert!(matches!(
            unemployment_jacobian(0.5, 0.1, &short, 5, DEFAULT_STEP),
            Err(ModelError::ShapeMismatch { .. })
        ));
    }
}
