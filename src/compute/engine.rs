use crate::compute::ledger::Ledger;
use crate::error::{ModelError, Result};
use crate::graph::{Block, BlockKind, JacobianBlock, Model, ModelBlock, Point};
use crate::solver::root::{brent, find_bracket};
use crate::store::{Shift, SteadyState};
use tracing::{debug, trace};

const ROOT_TOL: f64 = 1e-14;
const PATH_TOL: f64 = 1e-12;
const MAX_SWEEPS: usize = 500;

/// Nonlinear evaluator: runs every block of a model in order along the paths
/// held in a ledger.
pub struct Engine;

impl Engine {
    /// Evaluates `model` block by block, writing every produced series into
    /// `ledger`. Series the ledger already holds for an implicit block's
    /// unknown are used as the initial guess.
    pub fn run(model: &Model, ss: &SteadyState, ledger: &mut Ledger) -> Result<()> {
        for block in model.ordered() {
            match block {
                ModelBlock::Equation(b) => match &b.kind {
                    BlockKind::Explicit => Self::run_explicit(b, ss, ledger)?,
                    BlockKind::Implicit { unknown, bracket, unknown_shifts } => {
                        Self::run_implicit(b, unknown, *bracket, unknown_shifts, ss, ledger)?
                    }
                },
                ModelBlock::Jacobian(j) => Self::run_jacobian(j, ss, ledger)?,
            }
        }
        Ok(())
    }

    fn run_explicit(block: &Block, ss: &SteadyState, ledger: &mut Ledger) -> Result<()> {
        let horizon = ledger.horizon();
        let mut out = vec![vec![0.0; horizon]; block.outputs.len()];
        for t in 0..horizon {
            let values = block.evaluate(&Point::on_path(ss, ledger, t))?;
            for (series, v) in out.iter_mut().zip(values) {
                series[t] = v;
            }
        }
        for (name, series) in block.outputs.iter().zip(out) {
            ledger.insert(*name, series)?;
        }
        Ok(())
    }

    /// Gauss-Seidel sweeps over t, each period solved by Brent. Blocks whose
    /// residual only looks ahead are swept backward so one sweep suffices.
    fn run_implicit(
        block: &Block,
        unknown: &'static str,
        (lo, hi): (f64, f64),
        unknown_shifts: &[Shift],
        ss: &SteadyState,
        ledger: &mut Ledger,
    ) -> Result<()> {
        let horizon = ledger.horizon();
        if !ledger.contains(unknown) {
            ledger.insert(unknown, vec![ss.value(unknown)?; horizon])?;
        }

        let mut offsets = Vec::with_capacity(unknown_shifts.len());
        for shift in unknown_shifts {
            offsets.push(shift.resolve(ss)?);
        }
        let backward = offsets.iter().all(|&k| k >= 0) && offsets.iter().any(|&k| k > 0);
        let periods: Vec<usize> = if backward { (0..horizon).rev().collect() } else { (0..horizon).collect() };

        let mut sweeps = 0;
        loop {
            let mut max_change: f64 = 0.0;
            for &t in &periods {
                let current = ledger.series(unknown)?[t];
                // Surfaces missing parameters as errors rather than NaN.
                block.evaluate(&Point::on_path(ss, ledger, t))?;

                let view: &Ledger = ledger;
                let residual = |x: f64| match block.evaluate(&Point::on_path(ss, view, t).with_trial(unknown, x)) {
                    Ok(r) => r[0],
                    Err(_) => f64::NAN,
                };
                let not_bracketed = || ModelError::RootNotBracketed { block: block.name.to_string(), t, lo, hi };
                let (a, b) = find_bracket(residual, lo, hi, current).ok_or_else(not_bracketed)?;
                let root = brent(residual, a, b, ROOT_TOL).ok_or_else(not_bracketed)?;

                max_change = max_change.max((root - current).abs());
                if let Some(series) = ledger.series_mut(unknown) {
                    series[t] = root;
                }
            }
            sweeps += 1;
            trace!(block = block.name, sweeps, max_change, "Implicit sweep");
            if max_change < PATH_TOL {
                break;
            }
            if sweeps >= MAX_SWEEPS {
                return Err(ModelError::NoConvergence { block: block.name.to_string(), iterations: sweeps });
            }
        }
        debug!(block = block.name, sweeps, "Solved implicit block");

        if block.outputs.len() > 1 {
            let mut out = vec![vec![0.0; horizon]; block.outputs.len() - 1];
            for t in 0..horizon {
                let values = block.evaluate(&Point::on_path(ss, ledger, t))?;
                for (series, v) in out.iter_mut().zip(values.into_iter().skip(1)) {
                    series[t] = v;
                }
            }
            for (name, series) in block.outputs.iter().skip(1).zip(out) {
                ledger.insert(*name, series)?;
            }
        }
        Ok(())
    }

    /// First-order response: `ss + sum_i J_i (x_i - ss_i)`. Inputs the ledger
    /// does not hold sit at their steady state.
    fn run_jacobian(block: &JacobianBlock, ss: &SteadyState, ledger: &mut Ledger) -> Result<()> {
        let horizon = ledger.horizon();
        if block.horizon() != horizon {
            return Err(ModelError::ShapeMismatch {
                context: format!("Jacobian block '{}'", block.name()),
                expected: horizon,
                found: block.horizon(),
            });
        }

        let mut produced = Vec::new();
        for output in block.outputs() {
            let mut path = vec![ss.value(output)?; horizon];
            for (input, jac) in block.entries(output) {
                let Some(series) = ledger.get(input) else { continue };
                let base = ss.value(input)?;
                for s in 0..horizon {
                    let dx = series[s] - base;
                    if dx == 0.0 {
                        continue;
                    }
                    for (t, p) in path.iter_mut().enumerate() {
                        *p += jac[(t, s)] * dx;
                    }
                }
            }
            produced.push((output.to_string(), path));
        }
        for (name, path) in produced {
            ledger.insert(name, path)?;
        }
        Ok(())
    }
}
