//! Linear general-equilibrium solver and the scalar root finder used by
//! implicit blocks.
pub mod linearize;
pub mod problem;
pub mod root;
pub mod sequence_space;

pub use problem::ImpulseProblem;
pub use sequence_space::{GeSolver, SequenceSpaceSolver};
