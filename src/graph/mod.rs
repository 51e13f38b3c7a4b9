//! Equilibrium blocks and model composition.
pub mod block;
pub mod dag;
pub mod jacobian_block;
pub mod library;

pub use block::{Block, BlockKind, EvalFn, Point};
pub use dag::{Model, ModelBlock};
pub use jacobian_block::{JacobianBlock, JacobianDict};
