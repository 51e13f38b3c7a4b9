//! dag.rs
//! Composes equation blocks and Jacobian blocks into a model, ordered so
//! that every producer runs before its consumers.

use super::block::Block;
use super::jacobian_block::JacobianBlock;
use crate::analysis::topology;
use crate::compute::{Engine, Ledger};
use crate::error::Result;
use crate::solver::{GeSolver, ImpulseProblem, SequenceSpaceSolver};
use crate::store::{BlockRegistry, SteadyState};
use std::sync::Arc;

/// One entry of a model: a declarative equation or a precomputed Jacobian.
#[derive(Debug, Clone)]
pub enum ModelBlock {
    Equation(Block),
    Jacobian(Arc<JacobianBlock>),
}

impl ModelBlock {
    pub fn name(&self) -> &str {
        match self {
            ModelBlock::Equation(b) => b.name,
            ModelBlock::Jacobian(j) => j.name(),
        }
    }

    pub fn inputs(&self) -> Vec<&str> {
        match self {
            ModelBlock::Equation(b) => b.input_names(),
            ModelBlock::Jacobian(j) => j.inputs().into_iter().collect(),
        }
    }

    pub fn produces(&self) -> Vec<&str> {
        match self {
            ModelBlock::Equation(b) => b.produces(),
            ModelBlock::Jacobian(j) => j.outputs().collect(),
        }
    }
}

impl From<Block> for ModelBlock {
    fn from(b: Block) -> Self { ModelBlock::Equation(b) }
}

impl From<Arc<JacobianBlock>> for ModelBlock {
    fn from(j: Arc<JacobianBlock>) -> Self { ModelBlock::Jacobian(j) }
}

#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    registry: BlockRegistry,
    order: Vec<usize>,
}

impl Model {
    /// Registers the blocks and fixes an evaluation order.
    ///
    /// Fails on duplicate block names, on a variable with two producers and on
    /// a dependency cycle.
    pub fn new(name: impl Into<String>, blocks: impl IntoIterator<Item = ModelBlock>) -> Result<Self> {
        let mut registry = BlockRegistry::new();
        for block in blocks {
            registry.add(block)?;
        }
        let order = topology::sort(&registry)?;
        Ok(Self { name: name.into(), registry, order })
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn block_count(&self) -> usize { self.registry.count() }

    /// Blocks in evaluation order.
    pub fn ordered(&self) -> impl Iterator<Item = &ModelBlock> {
        self.order.iter().map(|&i| self.registry.get(i))
    }

    pub fn block(&self, name: &str) -> Option<&ModelBlock> {
        self.registry.blocks.iter().find(|b| b.name() == name)
    }

    pub fn produces(&self, var: &str) -> bool {
        self.registry.producer_of(var).is_some()
    }

    pub fn producer_of(&self, var: &str) -> Option<&ModelBlock> {
        self.registry.producer_of(var).map(|i| self.registry.get(i))
    }

    /// Linear impulse response to `problem.shocks`, solved with the default
    /// sequence-space solver.
    pub fn solve_impulse_linear(&self, ss: &SteadyState, problem: &ImpulseProblem) -> Result<Ledger> {
        self.solve_impulse_with(&SequenceSpaceSolver::default(), ss, problem)
    }

    pub fn solve_impulse_with<S: GeSolver + ?Sized>(
        &self,
        solver: &S,
        ss: &SteadyState,
        problem: &ImpulseProblem,
    ) -> Result<Ledger> {
        solver.solve_impulse(self, ss, problem)
    }

    /// Nonlinear evaluation of every block along the paths in `inputs`.
    ///
    /// Implicit blocks are solved period by period with a bracketed root
    /// finder. The returned ledger holds the inputs plus everything produced.
    pub fn evaluate(&self, ss: &SteadyState, inputs: &Ledger) -> Result<Ledger> {
        let mut ledger = inputs.clone();
        Engine::run(self, ss, &mut ledger)?;
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::graph::Point;

    fn noop(_: &Point<'_>) -> Result<Vec<f64>> { Ok(vec![0.0]) }

    fn eq(b: Block) -> ModelBlock { ModelBlock::Equation(b) }

    #[test]
    fn test_order_respects_dependencies() {
        // Listed consumer-first on purpose.
        let model = Model::new("m", [
            eq(Block::explicit("mc", &["MC"], noop).inputs_now(&["HC", "Z"])),
            eq(Block::explicit("hc", &["HC"], noop).inputs_now(&["w"])),
            eq(Block::explicit("wage", &["w"], noop).inputs_now(&["N"])),
        ])
        .unwrap();

        let names: Vec<&str> = model.ordered().map(|b| b.name()).collect();
        assert_eq!(names, vec!["wage", "hc", "mc"]);
        assert!(model.produces("HC"));
        assert!(!model.produces("N"));
        assert_eq!(model.producer_of("w").map(|b| b.name()), Some("wage"));
    }

    #[test]
    fn test_duplicate_producer_is_rejected() {
        let err = Model::new("m", [
            eq(Block::explicit("a", &["tau"], noop)),
            eq(Block::explicit("b", &["tau"], noop)),
        ])
        .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateProducer { .. }), "{}", err);
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let err = Model::new("m", [
            eq(Block::explicit("a", &["x"], noop)),
            eq(Block::explicit("a", &["y"], noop)),
        ])
        .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateBlock(ref n) if n == "a"));
    }
}
