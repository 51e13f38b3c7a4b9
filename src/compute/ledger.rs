use crate::error::{ModelError, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Named time series of a common length.
///
/// Holds input paths for nonlinear evaluation and the impulse responses the
/// linear solver returns. Series are shared behind `Arc`, so cloning a ledger
/// to hand it to another run is cheap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    horizon: usize,
    series: BTreeMap<String, Arc<Vec<f64>>>,
}

impl Ledger {
    pub fn new(horizon: usize) -> Self {
        Self { horizon, series: BTreeMap::new() }
    }

    pub fn horizon(&self) -> usize { self.horizon }
    pub fn len(&self) -> usize { self.series.len() }
    pub fn is_empty(&self) -> bool { self.series.is_empty() }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        if values.len() != self.horizon {
            return Err(ModelError::ShapeMismatch {
                context: format!("series '{}'", name),
                expected: self.horizon,
                found: values.len(),
            });
        }
        self.series.insert(name, Arc::new(values));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(|s| s.as_slice())
    }

    pub fn series(&self, name: &str) -> Result<&[f64]> {
        self.get(name).ok_or_else(|| ModelError::MissingSeries(name.to_string()))
    }

    /// Copy-on-write access for in-place updates.
    pub fn series_mut(&mut self, name: &str) -> Option<&mut Vec<f64>> {
        self.series.get_mut(name).map(Arc::make_mut)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.series.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.series.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_wrong_length() {
        let mut ledger = Ledger::new(4);
        assert!(ledger.insert("Y", vec![0.0; 4]).is_ok());
        let err = ledger.insert("C", vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { expected: 4, found: 3, .. }));
    }

    #[test]
    fn test_clone_shares_until_written() {
        let mut a = Ledger::new(2);
        a.insert("B", vec![1.0, 2.0]).unwrap();
        let mut b = a.clone();
        b.series_mut("B").unwrap()[0] = 9.0;

        assert_eq!(a.series("B").unwrap(), &[1.0, 2.0]);
        assert_eq!(b.series("B").unwrap(), &[9.0, 2.0]);
        assert!(matches!(a.series("qb"), Err(ModelError::MissingSeries(_))));
    }
}
