use super::SteadyState;
use crate::error::Result;
use std::fmt;

/// A time offset attached to a block input.
///
/// `Fixed(-1)` reads the previous period, `Fixed(1)` the next. The parameter
/// variants take the offset from the steady state so that a run can move it
/// through overrides (`B(deficit_T)`, `pi(-lag)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shift {
    Fixed(i32),
    Param(&'static str),
    NegParam(&'static str),
}

impl Shift {
    pub const NOW: Shift = Shift::Fixed(0);

    pub fn resolve(&self, ss: &SteadyState) -> Result<i32> {
        match *self {
            Shift::Fixed(k) => Ok(k),
            Shift::Param(name) => Ok(ss.offset(name)?),
            Shift::NegParam(name) => Ok(-ss.offset(name)?),
        }
    }

    /// Name of the steady-state entry this shift reads, if any.
    pub fn param(&self) -> Option<&'static str> {
        match *self {
            Shift::Fixed(_) => None,
            Shift::Param(name) | Shift::NegParam(name) => Some(name),
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shift::Fixed(0) => Ok(()),
            Shift::Fixed(k) => write!(f, "({:+})", k),
            Shift::Param(name) => write!(f, "({})", name),
            Shift::NegParam(name) => write!(f, "(-{})", name),
        }
    }
}
