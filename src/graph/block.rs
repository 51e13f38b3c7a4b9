//! Declarative equilibrium blocks.
//!
//! A block is a data record: a name, a kind, the (variable, shift) pairs it
//! reads, the names it writes and a plain function that evaluates it at one
//! point in time. Nothing is inferred from function signatures; the input list
//! is the block's contract with the solver.
use crate::compute::Ledger;
use crate::error::Result;
use crate::store::{Shift, SteadyState};
use std::fmt;

pub type EvalFn = fn(&Point<'_>) -> Result<Vec<f64>>;

#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// Each output is computed directly from the inputs.
    Explicit,
    /// `outputs[0]` is a residual that the block drives to zero by choosing
    /// `unknown`; the remaining outputs are computed at the solution.
    Implicit {
        unknown: &'static str,
        bracket: (f64, f64),
        unknown_shifts: Vec<Shift>,
    },
}

#[derive(Clone)]
pub struct Block {
    pub name: &'static str,
    pub kind: BlockKind,
    pub inputs: Vec<(&'static str, Shift)>,
    pub outputs: Vec<&'static str>,
    pub eval: EvalFn,
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish()
    }
}

impl Block {
    pub fn explicit(name: &'static str, outputs: &[&'static str], eval: EvalFn) -> Self {
        Self {
            name,
            kind: BlockKind::Explicit,
            inputs: Vec::new(),
            outputs: outputs.to_vec(),
            eval,
        }
    }

    /// `outputs[0]` names the residual.
    pub fn implicit(
        name: &'static str,
        unknown: &'static str,
        bracket: (f64, f64),
        outputs: &[&'static str],
        eval: EvalFn,
    ) -> Self {
        Self {
            name,
            kind: BlockKind::Implicit { unknown, bracket, unknown_shifts: vec![Shift::NOW] },
            inputs: Vec::new(),
            outputs: outputs.to_vec(),
            eval,
        }
    }

    pub fn input(self, var: &'static str, offset: i32) -> Self {
        self.input_shift(var, Shift::Fixed(offset))
    }

    pub fn input_shift(mut self, var: &'static str, shift: Shift) -> Self {
        if !self.inputs.contains(&(var, shift)) {
            self.inputs.push((var, shift));
        }
        self
    }

    pub fn inputs_now(self, vars: &[&'static str]) -> Self {
        vars.iter().fold(self, |b, &v| b.input(v, 0))
    }

    /// Declares another lead or lag of the unknown that the residual reads.
    pub fn unknown_at(mut self, shift: Shift) -> Self {
        if let BlockKind::Implicit { unknown_shifts, .. } = &mut self.kind {
            if !unknown_shifts.contains(&shift) {
                unknown_shifts.push(shift);
            }
        }
        self
    }

    pub fn unknown(&self) -> Option<&'static str> {
        match &self.kind {
            BlockKind::Implicit { unknown, .. } => Some(*unknown),
            BlockKind::Explicit => None,
        }
    }

    /// Variables this block writes into the model.
    pub fn produces(&self) -> Vec<&'static str> {
        match &self.kind {
            BlockKind::Explicit => self.outputs.clone(),
            BlockKind::Implicit { unknown, .. } => {
                std::iter::once(*unknown).chain(self.outputs.iter().skip(1).copied()).collect()
            }
        }
    }

    /// Distinct variable names read from other blocks.
    pub fn input_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.inputs.iter().map(|(v, _)| *v).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Every (variable, offset) the evaluation reads, with parameter shifts
    /// resolved against `ss` and duplicates removed.
    pub fn references(&self, ss: &SteadyState) -> Result<Vec<(&'static str, i32)>> {
        let mut refs = Vec::with_capacity(self.inputs.len() + 2);
        for (var, shift) in &self.inputs {
            refs.push((*var, shift.resolve(ss)?));
        }
        if let BlockKind::Implicit { unknown, unknown_shifts, .. } = &self.kind {
            for shift in unknown_shifts {
                refs.push((*unknown, shift.resolve(ss)?));
            }
        }
        refs.sort_unstable();
        refs.dedup();
        Ok(refs)
    }

    pub fn evaluate(&self, point: &Point<'_>) -> Result<Vec<f64>> {
        (self.eval)(point)
    }
}

/// Where a block is being evaluated.
///
/// `Steady` reads every variable at its steady-state value, optionally with one
/// (variable, offset) bumped for finite differences. `Path` reads period
/// `t + offset` from a ledger; references outside `[0, T)` and variables the
/// ledger does not hold fall back to the steady state.
#[derive(Debug, Clone, Copy)]
pub struct Point<'a> {
    ss: &'a SteadyState,
    source: Source<'a>,
}

#[derive(Debug, Clone, Copy)]
enum Source<'a> {
    Steady {
        bump: Option<(&'a str, i32, f64)>,
    },
    Path {
        ledger: &'a Ledger,
        t: usize,
        trial: Option<(&'a str, f64)>,
    },
}

impl<'a> Point<'a> {
    pub fn steady(ss: &'a SteadyState) -> Self {
        Self { ss, source: Source::Steady { bump: None } }
    }

    pub fn bumped(ss: &'a SteadyState, var: &'a str, offset: i32, delta: f64) -> Self {
        Self { ss, source: Source::Steady { bump: Some((var, offset, delta)) } }
    }

    pub fn on_path(ss: &'a SteadyState, ledger: &'a Ledger, t: usize) -> Self {
        Self { ss, source: Source::Path { ledger, t, trial: None } }
    }

    /// Replaces `var` at the current period with a trial value.
    pub fn with_trial(self, var: &'a str, value: f64) -> Self {
        match self.source {
            Source::Path { ledger, t, .. } => Self {
                ss: self.ss,
                source: Source::Path { ledger, t, trial: Some((var, value)) },
            },
            Source::Steady { .. } => self,
        }
    }

    pub fn at(&self, var: &str, offset: i32) -> Result<f64> {
        match self.source {
            Source::Steady { bump } => {
                let base = self.ss.value(var)?;
                match bump {
                    Some((v, k, delta)) if v == var && k == offset => Ok(base + delta),
                    _ => Ok(base),
                }
            }
            Source::Path { ledger, t, trial } => {
                if offset == 0 {
                    if let Some((v, value)) = trial {
                        if v == var {
                            return Ok(value);
                        }
                    }
                }
                let s = t as i64 + offset as i64;
                if s < 0 || s >= ledger.horizon() as i64 {
                    return self.ss.value(var);
                }
                match ledger.get(var) {
                    Some(series) => Ok(series[s as usize]),
                    None => self.ss.value(var),
                }
            }
        }
    }

    /// A steady-state parameter. Never bumped, never path-dependent.
    pub fn param(&self, name: &str) -> Result<f64> {
        self.ss.value(name)
    }

    pub fn offset(&self, name: &str) -> Result<i32> {
        self.ss.offset(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn production(x: &Point<'_>) -> Result<Vec<f64>> {
        Ok(vec![x.at("Z", 0)? * x.at("N", 0)?])
    }

    fn fiscal_rule(x: &Point<'_>) -> Result<Vec<f64>> {
        let dt = x.offset("deficit_T")?;
        Ok(vec![x.param("tau_ss")? + x.at("B", dt)?])
    }

    #[test]
    fn test_produces_swaps_residual_for_unknown() {
        let b = Block::implicit("fiscal", "B", (0.0, 10.0), &["fiscal_resid", "debt"], production)
            .unknown_at(Shift::Fixed(-1));
        assert_eq!(b.produces(), vec!["B", "debt"]);
        assert_eq!(b.unknown(), Some("B"));
    }

    #[test]
    fn test_references_resolve_param_shifts() {
        let ss = SteadyState::new().with("deficit_T", -1.0);
        let b = Block::implicit("fiscal", "B", (0.0, 10.0), &["fiscal_resid"], production)
            .unknown_at(Shift::Fixed(-1))
            .unknown_at(Shift::Param("deficit_T"))
            .input("N", 0)
            .input("N", 0);
        assert_eq!(b.references(&ss).unwrap(), vec![("B", -1), ("B", 0), ("N", 0)]);
    }

    #[test]
    fn test_steady_point_bumps_only_the_named_offset() {
        let ss = SteadyState::new().with("B", 1.0).with("tau_ss", 0.3).with("deficit_T", -1.0);
        let b = Block::explicit("fiscal_rule", &["tau"], fiscal_rule);

        let base = b.evaluate(&Point::steady(&ss)).unwrap()[0];
        let hit = b.evaluate(&Point::bumped(&ss, "B", -1, 0.1)).unwrap()[0];
        let miss = b.evaluate(&Point::bumped(&ss, "B", 0, 0.1)).unwrap()[0];

        assert!((base - 1.3).abs() < 1e-15);
        assert!((hit - 1.4).abs() < 1e-12);
        assert_eq!(miss, base);
    }

    #[test]
    fn test_path_point_falls_back_outside_horizon() {
        let ss = SteadyState::new().with("Z", 2.0).with("N", 0.5);
        let mut ledger = Ledger::new(3);
        ledger.insert("N", vec![0.6, 0.7, 0.8]).unwrap();

        let p = Point::on_path(&ss, &ledger, 0);
        assert_eq!(p.at("N", 0).unwrap(), 0.6);
        assert_eq!(p.at("N", -1).unwrap(), 0.5);
        assert_eq!(p.at("Z", 0).unwrap(), 2.0);
        assert_eq!(Point::on_path(&ss, &ledger, 2).at("N", 1).unwrap(), 0.5);
        assert_eq!(p.with_trial("N", 0.9).at("N", 0).unwrap(), 0.9);
        assert_eq!(p.with_trial("N", 0.9).at("N", 1).unwrap(), 0.7);
    }
}
