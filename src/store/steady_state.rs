use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named steady-state values: the point every linearization is taken around.
///
/// Runs never mutate a shared steady state. Overrides go through `with` and
/// `with_overrides`, which hand back a modified copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SteadyState {
    values: BTreeMap<String, f64>,
}

impl SteadyState {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Result<f64> {
        self.get(name)
            .ok_or_else(|| ModelError::MissingSteadyStateValue(name.to_string()))
    }

    /// Reads an integer-valued entry such as `deficit_T` or `lag`.
    pub fn offset(&self, name: &str) -> Result<i32> {
        Ok(self.value(name)?.round() as i32)
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_overrides<'a>(&self, overrides: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let mut out = self.clone();
        for (name, value) in overrides {
            out.set(name, value);
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl FromIterator<(String, f64)> for SteadyState {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_leave_base_untouched() {
        let base = SteadyState::new().with("phi_pi", 1.5).with("phi_b", 0.015);
        let tight = base.with_overrides([("phi_pi", 2.5)]);

        assert_eq!(base.value("phi_pi").unwrap(), 1.5);
        assert_eq!(tight.value("phi_pi").unwrap(), 2.5);
        assert_eq!(tight.value("phi_b").unwrap(), 0.015);
    }

    #[test]
    fn test_missing_value_names_the_key() {
        let ss = SteadyState::new();
        let err = ss.value("qb").unwrap_err();
        assert!(err.to_string().contains("'qb'"), "Msg: {}", err);
    }

    #[test]
    fn test_serde_is_a_flat_map() {
        let ss = SteadyState::new().with("B", 0.5).with("lag", -1.0);
        let json = serde_json::to_string(&ss).unwrap();
        assert_eq!(json, r#"{"B":0.5,"lag":-1.0}"#);
        let back: SteadyState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ss);
        assert_eq!(back.offset("lag").unwrap(), -1);
    }
}
