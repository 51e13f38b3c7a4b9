//! Sequence-space general equilibrium for a HANK model with search-and-matching
//! labor frictions, and the fiscal multipliers it implies.
//!
//! The pipeline runs leaves first:
//! 1. `calibration` builds the labor-market Markov chain, the unemployment
//!    Jacobian and the closed-form steady state.
//! 2. `graph` holds the equilibrium block library and composes blocks and
//!    precomputed Jacobians into a `Model`.
//! 3. `solver` linearizes the model and solves for impulse responses.
//! 4. `experiments` runs the fiscal policy experiments and turns impulse
//!    responses into multipliers.

pub mod analysis;
pub mod calibration;
pub mod compute;
pub mod display;
pub mod error;
pub mod experiments;
pub mod graph;
pub mod household;
pub mod solver;
pub mod store;
pub mod validation;

pub use calibration::{Calibration, ExperimentConfig, ParamOverrides};
pub use compute::Ledger;
pub use error::{ModelError, Result};
pub use experiments::{compute_fiscal_multipliers, Economy, FiscalMultipliers};
pub use graph::{Block, JacobianBlock, Model, ModelBlock};
pub use solver::{GeSolver, ImpulseProblem, SequenceSpaceSolver};
pub use store::SteadyState;
