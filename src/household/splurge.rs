//! Splurge adjustment: a share of every policy-driven income change is spent
//! on arrival, on top of what the consumption Jacobian implies.
use super::store::HouseholdJacobians;
use crate::error::{ModelError, Result};
use nalgebra::DMatrix;

pub const DEFAULT_SHARE: f64 = 0.3;

/// Inputs the adjustment is applied to.
pub const SPLURGE_INPUTS: [&str; 6] = ["transfers", "tau", "UI_extend", "UI_rr", "eta", "w"];

/// Returns `(C', A')` with
/// `C' = share * diag(pv_s * R^s) + (1 - share) * C` and `A' = (1 - share) * A`,
/// where `pv_s = sum_t C[t, s] / R^t`.
pub fn splurge_adjust(c: &DMatrix<f64>, a: &DMatrix<f64>, big_r: f64, share: f64) -> (DMatrix<f64>, DMatrix<f64>) {
    let n = c.ncols();
    let mut adjusted = c * (1.0 - share);
    for s in 0..n {
        let pv: f64 = c.column(s).iter().enumerate().map(|(t, x)| x / big_r.powi(t as i32)).sum();
        adjusted[(s, s)] += share * pv * big_r.powi(s as i32);
    }
    (adjusted, a * (1.0 - share))
}

/// Applies [`splurge_adjust`] in place to each named input of the aggregate
/// Jacobians. Education-group Jacobians are left as they are.
pub fn apply_splurge(jacobians: &mut HouseholdJacobians, inputs: &[&str], big_r: f64, share: f64) -> Result<()> {
    for &input in inputs {
        let missing = |output: &str| ModelError::MissingJacobian { output: output.into(), input: input.into() };
        let c = jacobians.consumption.get(input).ok_or_else(|| missing("C"))?;
        let a = jacobians.assets.get(input).ok_or_else(|| missing("A"))?;
        let (c_new, a_new) = splurge_adjust(c, a, big_r, share);
        jacobians.consumption.insert(input.to_string(), c_new);
        jacobians.assets.insert(input.to_string(), a_new);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::household::store::InputJacobians;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn consumption() -> DMatrix<f64> {
        DMatrix::from_fn(4, 4, |t, s| if t >= s { 0.25 * 0.75f64.powi((t - s) as i32) } else { 0.01 })
    }

    #[test]
    fn test_zero_share_is_identity() {
        let c = consumption();
        let a = c.map(|x| 2.0 * x);
        let (c2, a2) = splurge_adjust(&c, &a, 1.01, 0.0);
        assert_eq!(c2, c);
        assert_eq!(a2, a);
    }

    #[test]
    fn test_full_share_is_present_value_diagonal() {
        let c = consumption();
        let (c2, a2) = splurge_adjust(&c, &c, 1.01, 1.0);
        assert!(a2.iter().all(|&x| x == 0.0));
        for s in 0..4 {
            let pv: f64 = (0..4).map(|t| c[(t, s)] / 1.01f64.powi(t as i32)).sum();
            assert_relative_eq!(c2[(s, s)], pv * 1.01f64.powi(s as i32), epsilon = 1e-14);
            for t in (0..4).filter(|&t| t != s) {
                assert_eq!(c2[(t, s)], 0.0);
            }
        }
    }

    #[rstest]
    #[case(0.3)]
    #[case(0.7)]
    fn test_present_value_of_each_column_is_preserved(#[case] share: f64) {
        let c = consumption();
        let r = 1.01f64;
        let (c2, _) = splurge_adjust(&c, &c, r, share);
        for s in 0..4 {
            let pv = |m: &DMatrix<f64>| (0..4).map(|t| m[(t, s)] / r.powi(t as i32)).sum::<f64>();
            assert_relative_eq!(pv(&c2), pv(&c), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_missing_input_is_reported() {
        let mut c = InputJacobians::new();
        c.insert("transfers".into(), consumption());
        let mut jac = HouseholdJacobians::new(c.clone(), c).unwrap();
        let err = apply_splurge(&mut jac, &SPLURGE_INPUTS, 1.01, DEFAULT_SHARE).unwrap_err();
        assert!(matches!(err, ModelError::MissingJacobian { ref input, .. } if input == "tau"), "{}", err);
    }
}
