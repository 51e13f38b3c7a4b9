//! First-order expansion of equation blocks around the steady state.
use crate::calibration::params::check_step;
use crate::compute::ShiftOperator;
use crate::error::Result;
use crate::graph::{Block, Point};
use crate::store::SteadyState;
use std::collections::BTreeMap;

/// Derivatives of each output of a block, aligned with `Block::outputs`.
/// `ops[i][var]` is the shift operator mapping the deviation of `var` to the
/// deviation of output `i`.
#[derive(Debug, Clone, Default)]
pub struct LinearBlock {
    pub ops: Vec<BTreeMap<&'static str, ShiftOperator>>,
}

impl LinearBlock {
    pub fn output(&self, i: usize) -> Option<&BTreeMap<&'static str, ShiftOperator>> {
        self.ops.get(i)
    }
}

/// Central finite differences with respect to every (variable, offset) the
/// block references. The step is scaled by `max(1, |ss|)`.
pub fn linearize(block: &Block, ss: &SteadyState, step: f64) -> Result<LinearBlock> {
    check_step("linearization_step", step)?;
    let mut ops = vec![BTreeMap::<&'static str, ShiftOperator>::new(); block.outputs.len()];
    for (var, k) in block.references(ss)? {
        let h = step * ss.value(var)?.abs().max(1.0);
        let up = block.evaluate(&Point::bumped(ss, var, k, h))?;
        let down = block.evaluate(&Point::bumped(ss, var, k, -h))?;
        for (i, (u, d)) in up.iter().zip(&down).enumerate() {
            let deriv = (u - d) / (2.0 * h);
            if deriv != 0.0 {
                ops[i].entry(var).or_default().add_term(k, deriv);
            }
        }
    }
    Ok(LinearBlock { ops })
}
