use crate::error::{ModelError, Result};
use crate::graph::ModelBlock;
use std::collections::{HashMap, HashSet};

/// Columnar store of the blocks that make up a model.
///
/// Block names are unique and every variable has at most one producer.
/// Violations are errors; nothing is renamed.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    pub blocks: Vec<ModelBlock>,
    producers: HashMap<String, usize>,
    used_names: HashSet<String>,
}

impl BlockRegistry {
    pub fn new() -> Self { Self::default() }
    pub fn count(&self) -> usize { self.blocks.len() }

    pub fn add(&mut self, block: ModelBlock) -> Result<usize> {
        let id = self.blocks.len();

        // 1. Unique name
        if !self.used_names.insert(block.name().to_string()) {
            return Err(ModelError::DuplicateBlock(block.name().to_string()));
        }

        // 2. Single producer per variable
        for var in block.produces() {
            if let Some(&first) = self.producers.get(var) {
                return Err(ModelError::DuplicateProducer {
                    var: var.to_string(),
                    first: self.blocks[first].name().to_string(),
                    second: block.name().to_string(),
                });
            }
            self.producers.insert(var.to_string(), id);
        }

        self.blocks.push(block);
        Ok(id)
    }

    #[inline(always)]
    pub fn get(&self, id: usize) -> &ModelBlock {
        &self.blocks[id]
    }

    pub fn producer_of(&self, var: &str) -> Option<usize> {
        self.producers.get(var).copied()
    }

    /// Blocks whose outputs feed `id`.
    pub fn get_parents(&self, id: usize) -> Vec<usize> {
        let mut parents: Vec<usize> = self.blocks[id]
            .inputs()
            .into_iter()
            .filter_map(|var| self.producer_of(var))
            .filter(|&p| p != id)
            .collect();
        parents.sort_unstable();
        parents.dedup();
        parents
    }
}
