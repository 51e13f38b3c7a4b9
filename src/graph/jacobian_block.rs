//! Blocks given directly as sequence-space Jacobians.
use crate::error::{ModelError, Result};
use nalgebra::DMatrix;
use std::collections::{BTreeMap, BTreeSet};

/// output -> input -> T×T matrix, entry (t, s) = d output_t / d input_s.
pub type JacobianDict = BTreeMap<String, BTreeMap<String, DMatrix<f64>>>;

/// A block known only through its Jacobians, such as the household sector or
/// the employment-state distribution.
#[derive(Debug, Clone)]
pub struct JacobianBlock {
    name: String,
    horizon: usize,
    jacobians: JacobianDict,
}

impl JacobianBlock {
    /// Every matrix must be square with the same dimension.
    pub fn new(name: impl Into<String>, jacobians: JacobianDict) -> Result<Self> {
        let name = name.into();
        let horizon = jacobians
            .values()
            .flat_map(|inner| inner.values())
            .map(|m| m.nrows())
            .next()
            .ok_or_else(|| ModelError::ShapeMismatch {
                context: format!("Jacobian block '{}' has no entries", name),
                expected: 1,
                found: 0,
            })?;

        for (output, inner) in &jacobians {
            for (input, m) in inner {
                if m.nrows() != horizon || m.ncols() != horizon {
                    return Err(ModelError::ShapeMismatch {
                        context: format!("Jacobian '{}' of '{}' in block '{}'", input, output, name),
                        expected: horizon,
                        found: if m.nrows() != horizon { m.nrows() } else { m.ncols() },
                    });
                }
            }
        }

        Ok(Self { name, horizon, jacobians })
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn horizon(&self) -> usize { self.horizon }

    pub fn outputs(&self) -> impl Iterator<Item = &str> {
        self.jacobians.keys().map(String::as_str)
    }

    pub fn inputs(&self) -> BTreeSet<&str> {
        self.jacobians.values().flat_map(|inner| inner.keys().map(String::as_str)).collect()
    }

    pub fn get(&self, output: &str, input: &str) -> Option<&DMatrix<f64>> {
        self.jacobians.get(output)?.get(input)
    }

    /// The (input, Jacobian) pairs for one output.
    pub fn entries(&self, output: &str) -> impl Iterator<Item = (&str, &DMatrix<f64>)> {
        self.jacobians
            .get(output)
            .into_iter()
            .flat_map(|inner| inner.iter().map(|(k, v)| (k.as_str(), v)))
    }
}
