//! Linear impulse responses in sequence space.
//!
//! Every variable is tracked as a T x m sensitivity matrix: columns
//! `i*T..(i+1)*T` hold its response to unit moves of unknown `i` at each date,
//! and the last column holds its response to the combined shock path. Blocks
//! push these matrices forward in evaluation order; the target matrices then
//! give a square linear system in the unknowns.
use super::linearize::linearize;
use super::problem::ImpulseProblem;
use crate::analysis::SolveTelemetry;
use crate::compute::Ledger;
use crate::error::{ModelError, Result};
use crate::graph::{Block, BlockKind, JacobianBlock, Model, ModelBlock};
use crate::store::SteadyState;
use crate::validation::Validator;
use nalgebra::{DMatrix, DVector};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::debug;

/// The seam between a composed model and whatever solves it.
pub trait GeSolver: Send + Sync {
    fn solve_impulse(&self, model: &Model, ss: &SteadyState, problem: &ImpulseProblem) -> Result<Ledger>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceSpaceSolver {
    /// Relative step for central finite differences.
    pub fd_step: f64,
}

impl Default for SequenceSpaceSolver {
    fn default() -> Self {
        Self { fd_step: 1e-6 }
    }
}

type Sensitivities = BTreeMap<String, DMatrix<f64>>;

impl GeSolver for SequenceSpaceSolver {
    fn solve_impulse(&self, model: &Model, ss: &SteadyState, problem: &ImpulseProblem) -> Result<Ledger> {
        let start = Instant::now();
        problem.check_square()?;
        Validator::new(model, ss, problem).validate().map_err(ModelError::Validation)?;

        let horizon = problem.horizon;
        let n_unknowns = problem.unknowns.len();
        let width = n_unknowns * horizon;
        let cols = width + 1;

        // 1. Seed unknowns and shocks.
        let mut sens = Sensitivities::new();
        for (i, u) in problem.unknowns.iter().enumerate() {
            let mut m = DMatrix::zeros(horizon, cols);
            for t in 0..horizon {
                m[(t, i * horizon + t)] = 1.0;
            }
            sens.insert(u.clone(), m);
        }
        for (name, path) in &problem.shocks {
            let mut m = DMatrix::zeros(horizon, cols);
            m.set_column(width, &DVector::from_column_slice(path));
            sens.insert(name.clone(), m);
        }

        // 2. Propagate through the blocks.
        for block in model.ordered() {
            match block {
                ModelBlock::Equation(b) => self.propagate_equation(b, ss, horizon, &mut sens)?,
                ModelBlock::Jacobian(j) => propagate_jacobian(j, &mut sens),
            }
        }
        // Variables nothing moved still get a (zero) path.
        for block in model.ordered() {
            for name in block.produces() {
                if !sens.contains_key(name) {
                    sens.insert(name.to_string(), DMatrix::zeros(horizon, cols));
                }
            }
        }

        // 3. Stack targets and solve H_U dU = -H_Z.
        let rows = problem.targets.len() * horizon;
        let mut h_u = DMatrix::zeros(rows, width);
        let mut rhs = DVector::zeros(rows);
        for (k, target) in problem.targets.iter().enumerate() {
            if let Some(m) = sens.get(target) {
                h_u.view_mut((k * horizon, 0), (horizon, width)).copy_from(&m.columns(0, width));
                for t in 0..horizon {
                    rhs[k * horizon + t] = -m[(t, width)];
                }
            }
        }
        let d_u = h_u
            .clone()
            .lu()
            .solve(&rhs)
            .filter(|x| x.iter().all(|v| v.is_finite()))
            .ok_or_else(|| ModelError::SingularJacobian {
                context: format!("target Jacobian of '{}'", model.name()),
            })?;

        // 4. Responses of everything tracked.
        let mut irf = Ledger::new(horizon);
        for (name, m) in &sens {
            let path = m.columns(0, width) * &d_u + m.column(width);
            irf.insert(name.clone(), path.iter().copied().collect())?;
        }

        let residual = (&h_u * &d_u - &rhs).amax();
        SolveTelemetry {
            model: model.name().to_string(),
            horizon,
            unknowns: n_unknowns,
            targets: problem.targets.len(),
            tracked_variables: sens.len(),
            max_target_residual: residual,
            elapsed: start.elapsed(),
        }
        .log();
        Ok(irf)
    }
}

impl SequenceSpaceSolver {
    fn propagate_equation(&self, block: &Block, ss: &SteadyState, horizon: usize, sens: &mut Sensitivities) -> Result<()> {
        let lin = linearize(block, ss, self.fd_step)?;
        let cols = sens.values().next().map_or(1, |m| m.ncols());

        match &block.kind {
            BlockKind::Explicit => {
                for (name, ops) in block.outputs.iter().zip(&lin.ops) {
                    let mut dest = DMatrix::zeros(horizon, cols);
                    let mut moved = false;
                    for (var, op) in ops {
                        if let Some(src) = sens.get(*var) {
                            op.accumulate(src, &mut dest);
                            moved = true;
                        }
                    }
                    if moved {
                        sens.insert(name.to_string(), dest);
                    }
                }
            }
            BlockKind::Implicit { unknown, .. } => {
                let Some(resid) = lin.output(0) else { return Ok(()) };
                let fx = resid.get(unknown).map(|op| op.to_dense(horizon)).ok_or_else(|| {
                    ModelError::SingularJacobian { context: format!("block '{}' residual ignores '{}'", block.name, unknown) }
                })?;

                let mut rhs = DMatrix::zeros(horizon, cols);
                let mut moved = false;
                for (var, op) in resid {
                    if var == unknown {
                        continue;
                    }
                    if let Some(src) = sens.get(*var) {
                        op.accumulate(src, &mut rhs);
                        moved = true;
                    }
                }
                if moved {
                    let dx = fx.lu().solve(&rhs).ok_or_else(|| ModelError::SingularJacobian {
                        context: format!("block '{}'", block.name),
                    })?;
                    sens.insert(unknown.to_string(), -dx);
                }

                for (name, ops) in block.outputs.iter().zip(&lin.ops).skip(1) {
                    let mut dest = DMatrix::zeros(horizon, cols);
                    let mut moved = false;
                    for (var, op) in ops {
                        if let Some(src) = sens.get(*var) {
                            op.accumulate(src, &mut dest);
                            moved = true;
                        }
                    }
                    if moved {
                        sens.insert(name.to_string(), dest);
                    }
                }
            }
        }
        debug!(block = block.name, "Propagated equation block");
        Ok(())
    }
}

fn propagate_jacobian(block: &JacobianBlock, sens: &mut Sensitivities) {
    let mut produced = Vec::new();
    for output in block.outputs() {
        let mut dest: Option<DMatrix<f64>> = None;
        for (input, jac) in block.entries(output) {
            if let Some(src) = sens.get(input) {
                let d = dest.get_or_insert_with(|| DMatrix::zeros(jac.nrows(), src.ncols()));
                d.gemm(1.0, jac, src, 1.0);
            }
        }
        if let Some(d) = dest {
            produced.push((output.to_string(), d));
        }
    }
    sens.extend(produced);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{library, JacobianDict, Point};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn bond_model() -> (Model, SteadyState) {
        let ss = SteadyState::new()
            .with("delta", 0.95)
            .with("r_ante", 0.01)
            .with("qb", 1.0 / 0.06)
            .with("r", 0.01);
        let model = Model::new("bonds", [ModelBlock::from(library::bond_price()), ModelBlock::from(library::ex_post_rate())]).unwrap();
        (model, ss)
    }

    #[test]
    fn test_linear_matches_nonlinear_for_small_shock() {
        // r_ante is the unknown; the target pins it to the shock path.
        let (bonds, ss) = bond_model();
        let pin = Block::explicit("pin", &["pin_resid"], |x: &Point<'_>| {
            Ok(vec![x.at("r_ante", 0)? - x.at("r_shock", 0)? - x.param("r_ss")?])
        })
        .inputs_now(&["r_ante", "r_shock"]);
        let ss = ss.with("r_shock", 0.0).with("r_ss", 0.01).with("pin_resid", 0.0);
        let model = Model::new(
            "pinned",
            bonds.ordered().cloned().chain(std::iter::once(ModelBlock::from(pin))),
        )
        .unwrap();

        let horizon = 12;
        let mut shock = vec![0.0; horizon];
        shock[4] = 1e-5;
        let problem = ImpulseProblem::new(&["r_ante"], &["pin_resid"], horizon).with_shock("r_shock", shock.clone());
        let irf = model.solve_impulse_linear(&ss, &problem).unwrap();

        let mut paths = Ledger::new(horizon);
        paths.insert("r_ante", shock.iter().map(|s| 0.01 + s).collect()).unwrap();
        let levels = model.evaluate(&ss, &paths).unwrap();

        let qb_ss = ss.value("qb").unwrap();
        for t in 0..horizon {
            let nonlinear = levels.series("qb").unwrap()[t] - qb_ss;
            assert_relative_eq!(irf.series("qb").unwrap()[t], nonlinear, epsilon = 1e-8);
        }
        assert_relative_eq!(irf.series("r_ante").unwrap()[4], 1e-5, epsilon = 1e-12);
    }

    #[test]
    fn test_jacobian_block_passes_sensitivities() {
        // y = 2 x, target y - z = 0 with z shocked: x = z / 2.
        let horizon = 3;
        let mut row = BTreeMap::new();
        row.insert("x".to_string(), DMatrix::identity(horizon, horizon) * 2.0);
        let mut dict = JacobianDict::new();
        dict.insert("y".to_string(), row);
        let jac = Arc::new(JacobianBlock::new("double", dict).unwrap());
        let gap = Block::explicit("gap", &["gap"], |x: &Point<'_>| Ok(vec![x.at("y", 0)? - x.at("z", 0)?]))
            .inputs_now(&["y", "z"]);

        let model = Model::new("m", [ModelBlock::from(jac), ModelBlock::from(gap)]).unwrap();
        let ss = SteadyState::new().with("x", 0.0).with("y", 0.0).with("z", 0.0).with("gap", 0.0);
        let problem = ImpulseProblem::new(&["x"], &["gap"], horizon).with_shock("z", vec![1.0, 0.5, 0.0]);
        let irf = model.solve_impulse_linear(&ss, &problem).unwrap();

        let x = irf.series("x").unwrap();
        assert_relative_eq!(x[0], 0.5, epsilon = 1e-9);
        assert_relative_eq!(x[1], 0.25, epsilon = 1e-9);
        assert_relative_eq!(x[2], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unmoved_outputs_have_zero_paths() {
        // `idle` reads nothing the shock reaches.
        let (bonds, ss) = bond_model();
        let idle = Block::explicit("idle", &["idle_out"], |x: &Point<'_>| Ok(vec![2.0 * x.at("delta", 0)?]))
            .inputs_now(&["delta"]);
        let pin = Block::explicit("pin", &["pin_resid"], |x: &Point<'_>| {
            Ok(vec![x.at("r_ante", 0)? - x.at("r_shock", 0)? - x.param("r_ss")?])
        })
        .inputs_now(&["r_ante", "r_shock"]);
        let ss = ss.with("r_shock", 0.0).with("r_ss", 0.01).with("pin_resid", 0.0).with("idle_out", 1.9);
        let model = Model::new(
            "pinned",
            bonds.ordered().cloned().chain([ModelBlock::from(idle), ModelBlock::from(pin)]),
        )
        .unwrap();

        let problem = ImpulseProblem::new(&["r_ante"], &["pin_resid"], 5).with_shock("r_shock", vec![0.0, 1e-4, 0.0, 0.0, 0.0]);
        let irf = model.solve_impulse_linear(&ss, &problem).unwrap();
        for block in model.ordered() {
            for name in block.produces() {
                assert_eq!(irf.series(name).unwrap().len(), 5, "{}", name);
            }
        }
        assert!(irf.series("idle_out").unwrap().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_constant_target_is_singular() {
        let (model, ss) = bond_model();
        let ss = ss.with("shock", 0.0);
        // The unknown reaches no block, so the target Jacobian is zero.
        let problem = ImpulseProblem::new(&["shock"], &["r"], 4).with_shock("r_ante", vec![0.0; 4]);
        let err = model.solve_impulse_linear(&ss, &problem).unwrap_err();
        assert!(matches!(err, ModelError::SingularJacobian { .. }), "{}", err);
    }

    #[test]
    fn test_validation_runs_before_solving() {
        let (model, ss) = bond_model();
        let problem = ImpulseProblem::new(&["r_ante"], &["nope"], 4);
        let err = model.solve_impulse_linear(&ss, &problem).unwrap_err();
        assert!(matches!(err, ModelError::Validation(ref e) if e.len() == 1), "{}", err);

        let problem = ImpulseProblem::new(&["r_ante", "qb"], &["r"], 4);
        assert!(matches!(model.solve_impulse_linear(&ss, &problem), Err(ModelError::UnknownTargetMismatch { .. })));
    }
}
