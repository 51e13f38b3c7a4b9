//! Household sequence-space Jacobians read from disk.
//!
//! A Jacobian file holds aggregate consumption and asset Jacobians keyed by
//! policy input, optionally split by education group:
//!
//! ```text
//! { "C": { "transfers": [[..], ..], .. }, "A": { .. },
//!   "C_by_educ": { "dropout": { .. }, .. }, "A_by_educ": { .. } }
//! ```
//!
//! Matrices are nested row arrays, entry `[t][s]` = d output_t / d input_s.
use crate::error::{ModelError, Result};
use crate::graph::{JacobianBlock, JacobianDict};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// input -> T×T Jacobian
pub type InputJacobians = BTreeMap<String, DMatrix<f64>>;

type RawMatrix = Vec<Vec<f64>>;
type RawInputs = BTreeMap<String, RawMatrix>;

#[derive(Debug, Serialize, Deserialize)]
struct RawFile {
    #[serde(rename = "C")]
    consumption: RawInputs,
    #[serde(rename = "A")]
    assets: RawInputs,
    #[serde(rename = "C_by_educ", default, skip_serializing_if = "BTreeMap::is_empty")]
    consumption_by_educ: BTreeMap<String, RawInputs>,
    #[serde(rename = "A_by_educ", default, skip_serializing_if = "BTreeMap::is_empty")]
    assets_by_educ: BTreeMap<String, RawInputs>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EducGroup {
    pub consumption: InputJacobians,
    pub assets: InputJacobians,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdJacobians {
    horizon: usize,
    pub consumption: InputJacobians,
    pub assets: InputJacobians,
    pub by_educ: BTreeMap<String, EducGroup>,
}

/// Jacobians with respect to UI extensions that are realized rather than
/// merely announced.
#[derive(Debug, Clone, PartialEq)]
pub struct RealizedUi {
    pub consumption: DMatrix<f64>,
    pub assets: DMatrix<f64>,
}

pub const REALIZED_UI_INPUT: &str = "UI_extend_real";

impl HouseholdJacobians {
    /// Every matrix must be square, all with one common T.
    pub fn new(consumption: InputJacobians, assets: InputJacobians) -> Result<Self> {
        let horizon = consumption
            .values()
            .chain(assets.values())
            .map(|m| m.nrows())
            .next()
            .ok_or_else(|| ModelError::ShapeMismatch {
                context: "household Jacobians are empty".into(),
                expected: 1,
                found: 0,
            })?;
        let jac = Self { horizon, consumption, assets, by_educ: BTreeMap::new() };
        jac.check_shapes()?;
        Ok(jac)
    }

    pub fn with_educ_group(mut self, group: impl Into<String>, consumption: InputJacobians, assets: InputJacobians) -> Result<Self> {
        self.by_educ.insert(group.into(), EducGroup { consumption, assets });
        self.check_shapes()?;
        Ok(self)
    }

    pub fn horizon(&self) -> usize { self.horizon }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let raw: RawFile = serde_json::from_str(s)?;
        let mut jac = Self::new(to_matrices("C", raw.consumption)?, to_matrices("A", raw.assets)?)?;

        let mut groups: Vec<String> = raw.consumption_by_educ.keys().chain(raw.assets_by_educ.keys()).cloned().collect();
        groups.sort();
        groups.dedup();
        let (mut c_by, mut a_by) = (raw.consumption_by_educ, raw.assets_by_educ);
        for group in groups {
            let c = to_matrices(&format!("C_{}", group), c_by.remove(&group).unwrap_or_default())?;
            let a = to_matrices(&format!("A_{}", group), a_by.remove(&group).unwrap_or_default())?;
            jac = jac.with_educ_group(group, c, a)?;
        }
        Ok(jac)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let jac = Self::from_json_str(&std::fs::read_to_string(path)?)?;
        info!(
            path = %path.display(),
            horizon = jac.horizon,
            inputs = ?jac.consumption.keys().collect::<Vec<_>>(),
            groups = jac.by_educ.len(),
            "Loaded household Jacobians"
        );
        Ok(jac)
    }

    /// Reads a realized-UI file: `{"C": {"UI_extend_real": ..}, "A": {..}}`.
    pub fn load_realized(path: impl AsRef<Path>) -> Result<RealizedUi> {
        RealizedUi::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        let raw = RawFile {
            consumption: to_rows(&self.consumption),
            assets: to_rows(&self.assets),
            consumption_by_educ: self.by_educ.iter().map(|(g, e)| (g.clone(), to_rows(&e.consumption))).collect(),
            assets_by_educ: self.by_educ.iter().map(|(g, e)| (g.clone(), to_rows(&e.assets))).collect(),
        };
        Ok(serde_json::to_string(&raw)?)
    }

    /// Copy with the announced-UI Jacobians replaced by realized ones.
    ///
    /// `Economy::initialize` takes this copy before the splurge adjustment, so
    /// realized-UI runs see the raw household responses to every input.
    pub fn with_realized_ui(&self, realized: &RealizedUi) -> Result<Self> {
        let mut out = self.clone();
        out.consumption.insert("UI_extend".into(), realized.consumption.clone());
        out.assets.insert("UI_extend".into(), realized.assets.clone());
        out.check_shapes()?;
        Ok(out)
    }

    /// Aggregate block with outputs `C` and `A`.
    pub fn block(&self, name: &str) -> Result<JacobianBlock> {
        let mut dict = JacobianDict::new();
        dict.insert("C".into(), self.consumption.clone());
        dict.insert("A".into(), self.assets.clone());
        JacobianBlock::new(name, dict)
    }

    /// Outputs `C_<group>` and `A_<group>`; `None` when the file had no groups.
    pub fn by_educ_block(&self, name: &str) -> Option<Result<JacobianBlock>> {
        if self.by_educ.is_empty() {
            return None;
        }
        let mut dict = JacobianDict::new();
        for (group, e) in &self.by_educ {
            dict.insert(format!("C_{}", group), e.consumption.clone());
            dict.insert(format!("A_{}", group), e.assets.clone());
        }
        Some(JacobianBlock::new(name, dict))
    }

    fn check_shapes(&self) -> Result<()> {
        let groups = self.by_educ.iter().flat_map(|(g, e)| {
            e.consumption.iter().map(move |(i, m)| (format!("C_{}", g), i, m))
                .chain(e.assets.iter().map(move |(i, m)| (format!("A_{}", g), i, m)))
        });
        let all = self.consumption.iter().map(|(i, m)| ("C".to_string(), i, m))
            .chain(self.assets.iter().map(|(i, m)| ("A".to_string(), i, m)))
            .chain(groups);
        for (output, input, m) in all {
            check_square(&format!("household Jacobian {}/{}", output, input), m, self.horizon)?;
        }
        Ok(())
    }
}

impl RealizedUi {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let raw: RealizedFile = serde_json::from_str(s)?;
        let take = |output: &str, mut inputs: RawInputs| -> Result<DMatrix<f64>> {
            let rows = inputs.remove(REALIZED_UI_INPUT).ok_or_else(|| ModelError::MissingJacobian {
                output: output.to_string(),
                input: REALIZED_UI_INPUT.to_string(),
            })?;
            to_matrix(&format!("{}/{}", output, REALIZED_UI_INPUT), rows)
        };
        let consumption = take("C", raw.consumption)?;
        let assets = take("A", raw.assets)?;
        check_square("realized UI assets", &assets, consumption.nrows())?;
        Ok(Self { consumption, assets })
    }

    pub fn horizon(&self) -> usize { self.consumption.nrows() }
}

#[derive(Debug, Deserialize)]
struct RealizedFile {
    #[serde(rename = "C")]
    consumption: RawInputs,
    #[serde(rename = "A")]
    assets: RawInputs,
}

fn check_square(context: &str, m: &DMatrix<f64>, horizon: usize) -> Result<()> {
    if m.nrows() != horizon || m.ncols() != horizon {
        return Err(ModelError::ShapeMismatch {
            context: context.to_string(),
            expected: horizon,
            found: if m.nrows() != horizon { m.nrows() } else { m.ncols() },
        });
    }
    Ok(())
}

fn to_matrix(context: &str, rows: RawMatrix) -> Result<DMatrix<f64>> {
    let n = rows.len();
    if let Some(bad) = rows.iter().find(|r| r.len() != n) {
        return Err(ModelError::ShapeMismatch { context: context.to_string(), expected: n, found: bad.len() });
    }
    Ok(DMatrix::from_fn(n, n, |t, s| rows[t][s]))
}

fn to_matrices(output: &str, raw: RawInputs) -> Result<InputJacobians> {
    raw.into_iter()
        .map(|(input, rows)| {
            let m = to_matrix(&format!("household Jacobian {}/{}", output, input), rows)?;
            Ok((input, m))
        })
        .collect()
}

fn to_rows(jacobians: &InputJacobians) -> RawInputs {
    jacobians
        .iter()
        .map(|(input, m)| (input.clone(), m.row_iter().map(|r| r.iter().copied().collect()).collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lower(n: usize, v: f64) -> DMatrix<f64> {
        DMatrix::from_fn(n, n, |t, s| if t >= s { v } else { 0.0 })
    }

    fn sample() -> HouseholdJacobians {
        let mut c = InputJacobians::new();
        c.insert("transfers".into(), lower(3, 0.2));
        c.insert("UI_extend".into(), lower(3, 0.1));
        let mut a = InputJacobians::new();
        a.insert("transfers".into(), lower(3, 0.8));
        a.insert("UI_extend".into(), lower(3, 0.9));
        HouseholdJacobians::new(c, a).unwrap()
    }

    #[test]
    fn test_file_round_trip_with_groups() {
        let mut c = InputJacobians::new();
        c.insert("transfers".into(), lower(3, 0.5));
        let jac = sample().with_educ_group("college", c.clone(), c).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(jac.to_json_string().unwrap().as_bytes()).unwrap();
        let loaded = HouseholdJacobians::load(file.path()).unwrap();
        assert_eq!(loaded, jac);

        let block = loaded.by_educ_block("household_by_educ").unwrap().unwrap();
        assert!(block.get("C_college", "transfers").is_some());
        assert!(block.get("A_college", "transfers").is_some());
        assert!(sample().by_educ_block("x").is_none());
    }

    #[test]
    fn test_ragged_or_mixed_horizons_are_rejected() {
        let ragged = r#"{"C": {"transfers": [[1.0, 0.0], [1.0]]}, "A": {}}"#;
        assert!(matches!(HouseholdJacobians::from_json_str(ragged), Err(ModelError::ShapeMismatch { .. })));

        let mixed = r#"{"C": {"transfers": [[1.0]]}, "A": {"transfers": [[1.0, 0.0], [0.0, 1.0]]}}"#;
        assert!(matches!(HouseholdJacobians::from_json_str(mixed), Err(ModelError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_missing_file_and_bad_json_are_fatal() {
        assert!(matches!(HouseholdJacobians::load("/nonexistent/jacobians.json"), Err(ModelError::Io(_))));
        assert!(matches!(HouseholdJacobians::from_json_str("{\"C\": 3}"), Err(ModelError::Json(_))));
    }

    #[test]
    fn test_realized_ui_replaces_announced() {
        let realized = RealizedUi::from_json_str(
            r#"{"C": {"UI_extend_real": [[0.3, 0, 0], [0.1, 0.3, 0], [0, 0.1, 0.3]]},
                "A": {"UI_extend_real": [[0.7, 0, 0], [0.6, 0.7, 0], [0.5, 0.6, 0.7]]}}"#,
        )
        .unwrap();
        let swapped = sample().with_realized_ui(&realized).unwrap();
        assert_eq!(swapped.consumption["UI_extend"][(1, 0)], 0.1);
        assert_eq!(swapped.assets["UI_extend"][(2, 0)], 0.5);
        assert_eq!(swapped.consumption["transfers"], sample().consumption["transfers"]);

        let missing = RealizedUi::from_json_str(r#"{"C": {}, "A": {}}"#);
        assert!(matches!(missing, Err(ModelError::MissingJacobian { .. })));
    }
}
