//! Time-series storage, shift operators and the nonlinear block evaluator.
pub mod engine;
pub mod kernel;
pub mod ledger;

pub use engine::Engine;
pub use kernel::ShiftOperator;
pub use ledger::Ledger;
