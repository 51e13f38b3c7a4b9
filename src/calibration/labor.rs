//! Six-state labor-market Markov chain.
//!
//! States: employed, two UI-receiving unemployment durations, two durations
//! after UI exhaustion and a long-term absorbing spell. The matrix acts on
//! distributions as `dist_next = M * dist`, so *columns* hold the outflows of
//! each state. Rows do not sum to one and are not meant to.
use crate::error::{ModelError, Result};
use nalgebra::{DMatrix, DVector};
use tracing::debug;

pub const NUM_STATES: usize = 6;

const UNIT_TOL: f64 = 1e-8;

pub fn job_separation(eu_prob: f64, job_find: f64) -> f64 {
    eu_prob / (1.0 - job_find)
}

pub fn transition_matrix(job_find: f64, job_sep: f64) -> DMatrix<f64> {
    let f = job_find;
    let stay = 1.0 - f;
    #[rustfmt::skip]
    let m = DMatrix::from_row_slice(NUM_STATES, NUM_STATES, &[
        1.0 - job_sep * stay, f,    f,    f,    f,    f,
        job_sep * stay,       0.0,  0.0,  0.0,  0.0,  0.0,
        0.0,                  stay, 0.0,  0.0,  0.0,  0.0,
        0.0,                  0.0,  stay, 0.0,  0.0,  0.0,
        0.0,                  0.0,  0.0,  stay, 0.0,  0.0,
        0.0,                  0.0,  0.0,  0.0,  stay, stay,
    ]);
    m
}

/// The eigenvalue-1 eigenvector of `matrix`, real and normalized to sum to one.
///
/// Computed as the right singular vector of `M - I` with the smallest singular
/// value. Fails with `NoUnitEigenvalue` unless 1 is the dominant eigenvalue
/// and its eigenspace is one-dimensional.
pub fn stationary_distribution(matrix: &DMatrix<f64>) -> Result<DVector<f64>> {
    let n = matrix.nrows();
    if n == 0 || matrix.ncols() != n {
        return Err(ModelError::ShapeMismatch {
            context: "transition matrix".into(),
            expected: n,
            found: matrix.ncols(),
        });
    }

    // 1. Spectral radius must be 1.
    let spectral_radius = matrix
        .complex_eigenvalues()
        .iter()
        .map(|c| c.norm())
        .fold(0.0_f64, f64::max);
    if (spectral_radius - 1.0).abs() > UNIT_TOL {
        return Err(ModelError::NoUnitEigenvalue { spectral_radius });
    }

    // 2. Null space of M - I must be exactly one-dimensional.
    let shifted = matrix - DMatrix::<f64>::identity(n, n);
    let svd = shifted.svd(false, true);
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| svd.singular_values[a].total_cmp(&svd.singular_values[b]));
    let smallest = svd.singular_values[order[0]];
    let runner_up = if n > 1 { svd.singular_values[order[1]] } else { f64::INFINITY };
    if smallest > UNIT_TOL || runner_up <= UNIT_TOL {
        return Err(ModelError::NoUnitEigenvalue { spectral_radius });
    }

    let v_t = svd.v_t.ok_or_else(|| ModelError::SingularJacobian {
        context: "stationary distribution SVD".into(),
    })?;
    let null: DVector<f64> = v_t.row(order[0]).transpose();

    // 3. Normalize; a sign flip is absorbed by the sum.
    let total = null.sum();
    if total.abs() < UNIT_TOL {
        return Err(ModelError::NoUnitEigenvalue { spectral_radius });
    }
    let mut dist = null / total;
    if dist.iter().any(|&p| p < -1e-12) {
        return Err(ModelError::NoUnitEigenvalue { spectral_radius });
    }
    dist.apply(|p| *p = p.max(0.0));
    let total = dist.sum();
    Ok(dist / total)
}

#[derive(Debug, Clone)]
pub struct LaborMarket {
    pub job_find: f64,
    pub job_sep: f64,
    pub matrix: DMatrix<f64>,
    pub stationary: DVector<f64>,
}

impl LaborMarket {
    pub fn calibrate(job_find: f64, eu_prob: f64) -> Result<Self> {
        let job_sep = job_separation(eu_prob, job_find);
        let matrix = transition_matrix(job_find, job_sep);
        let stationary = stationary_distribution(&matrix)?;
        debug!(
            job_find,
            job_sep,
            employment = stationary[0],
            dist = ?stationary.as_slice(),
            "Calibrated labor market"
        );
        Ok(Self { job_find, job_sep, matrix, stationary })
    }

    pub fn employment(&self) -> f64 { self.stationary[0] }

    pub fn unemployment(&self) -> f64 {
        self.stationary.rows(1, NUM_STATES - 1).sum()
    }

    /// Occupancy of the five unemployment states U1..U5.
    pub fn unemployed_states(&self) -> [f64; NUM_STATES - 1] {
        let mut out = [0.0; NUM_STATES - 1];
        for (k, o) in out.iter_mut().enumerate() {
            *o = self.stationary[k + 1];
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(2.0 / 3.0, 0.0306834)]
    #[case(0.5, 0.02)]
    #[case(0.9, 0.05)]
    #[case(0.2, 0.001)]
    fn test_distribution_is_a_probability_vector(#[case] job_find: f64, #[case] eu: f64) {
        let labor = LaborMarket::calibrate(job_find, eu).unwrap();
        assert!((labor.stationary.sum() - 1.0).abs() < 1e-10);
        assert!(labor.stationary.iter().all(|&p| p >= 0.0));
        assert!((labor.employment() + labor.unemployment() - 1.0).abs() < 1e-10);

        let next = &labor.matrix * &labor.stationary;
        assert_relative_eq!(next, labor.stationary, epsilon = 1e-12);
    }

    #[test]
    fn test_matches_flow_balance() {
        // U1 = EU * N, each later spell loses a share f, the last one absorbs.
        let f = 2.0 / 3.0;
        let eu = 0.0306834;
        let q = 1.0 - f;
        let labor = LaborMarket::calibrate(f, eu).unwrap();

        let spells = 1.0 + q + q * q + q.powi(3) + q.powi(4) / f;
        let n = 1.0 / (1.0 + eu * spells);
        assert_relative_eq!(labor.employment(), n, epsilon = 1e-10);

        let u = labor.unemployed_states();
        assert_relative_eq!(u[0], eu * n, epsilon = 1e-10);
        assert_relative_eq!(u[1], q * u[0], epsilon = 1e-10);
        assert_relative_eq!(u[4], q * u[3] / f, epsilon = 1e-10);
    }

    #[test]
    fn test_rows_keep_model_convention() {
        let m = transition_matrix(2.0 / 3.0, 0.09);
        // Columns are distributions; rows are not.
        for j in 0..NUM_STATES {
            assert_relative_eq!(m.column(j).sum(), 1.0, epsilon = 1e-15);
        }
        assert!((m.row(0).sum() - 1.0).abs() > 0.5);
    }

    #[test]
    fn test_malformed_matrix_is_rejected() {
        let leaky = transition_matrix(2.0 / 3.0, 0.09) * 0.5;
        let err = stationary_distribution(&leaky).unwrap_err();
        assert!(matches!(err, ModelError::NoUnitEigenvalue { .. }), "{}", err);

        // Two closed classes: eigenvalue 1 twice.
        let split = DMatrix::<f64>::identity(3, 3);
        assert!(matches!(stationary_distribution(&split), Err(ModelError::NoUnitEigenvalue { .. })));
    }
}
