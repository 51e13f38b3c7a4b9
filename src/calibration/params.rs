//! Calibrated constants, experiment settings and per-run overrides.
use crate::error::{ModelError, Result};
use crate::store::SteadyState;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Quarterly calibration of the HANK+SAM economy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    // Labor market
    pub job_find: f64,
    pub eu_prob: f64,
    pub alpha: f64,
    pub phi_ss: f64,
    /// Vacancy posting cost as a share of the wage times `phi_ss`.
    pub hiring_cost_share: f64,

    // Household side, from the heterogeneous-agent steady state
    pub r_gross: f64,
    pub c_ss: f64,
    pub a_ss: f64,

    // Fiscal
    pub wage_ss: f64,
    pub tau_ss: f64,
    pub ui_replacement: f64,
    /// Share of long-bond principal still outstanding after a year.
    pub bond_annual_retention: f64,

    // Pricing
    pub epsilon_p: f64,
    pub varphi: f64,
    pub kappa_p: f64,

    // Policy rules
    pub phi_pi: f64,
    pub phi_y: f64,
    pub rho_r: f64,
    pub phi_b: f64,
    pub real_wage_rigidity: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            job_find: 2.0 / 3.0,
            eu_prob: 0.0306834,
            alpha: 0.65,
            phi_ss: 0.71,
            hiring_cost_share: 0.07,
            r_gross: 1.01,
            c_ss: 0.6910496136078721,
            a_ss: 1.4324029855872642,
            wage_ss: 1.0,
            tau_ss: 0.3,
            ui_replacement: 0.5,
            bond_annual_retention: 0.8,
            epsilon_p: 6.0,
            varphi: 96.9,
            kappa_p: 0.06191950464396284,
            phi_pi: 1.5,
            phi_y: 0.0,
            rho_r: 0.0,
            phi_b: 0.015,
            real_wage_rigidity: 0.837,
        }
    }
}

impl Calibration {
    pub fn r_ss(&self) -> f64 { self.r_gross - 1.0 }

    /// Steady-state marginal cost, the inverse markup.
    pub fn mc_ss(&self) -> f64 { (self.epsilon_p - 1.0) / self.epsilon_p }

    pub fn job_sep(&self) -> f64 { self.eu_prob / (1.0 - self.job_find) }
}

/// Everything an experiment run needs besides the household Jacobians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub calibration: Calibration,
    /// Truncation horizon T of every sequence.
    pub horizon: usize,
    /// Longest multiplier horizon reported.
    pub multiplier_horizon: usize,
    pub splurge_share: f64,
    /// Step on the job-finding probability for the unemployment Jacobian.
    pub ujac_step: f64,
    /// Relative step for block linearization.
    pub linearization_step: f64,
    pub stimulus_check_length: usize,
    pub monetary_policy_lag: i32,
    pub overrides: ParamOverrides,
    pub jacobian_path: Option<PathBuf>,
    pub realized_ui_path: Option<PathBuf>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            calibration: Calibration::default(),
            horizon: 300,
            multiplier_horizon: 20,
            splurge_share: 0.3,
            ujac_step: 1e-4,
            linearization_step: 1e-6,
            stimulus_check_length: 1,
            monetary_policy_lag: 2,
            overrides: ParamOverrides::default(),
            jacobian_path: None,
            realized_ui_path: None,
        }
    }
}

impl ExperimentConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings no run can use: non-positive or non-finite
    /// finite-difference steps, a splurge share outside [0, 1], an empty
    /// horizon or a multiplier horizon longer than it.
    pub fn validate(&self) -> Result<()> {
        for (field, step) in [("ujac_step", self.ujac_step), ("linearization_step", self.linearization_step)] {
            check_step(field, step)?;
        }
        if !(0.0..=1.0).contains(&self.splurge_share) {
            return Err(invalid("splurge_share", format!("{} is outside [0, 1]", self.splurge_share)));
        }
        if self.horizon == 0 {
            return Err(invalid("horizon", "must be at least 1".into()));
        }
        if self.multiplier_horizon > self.horizon {
            return Err(invalid(
                "multiplier_horizon",
                format!("{} exceeds horizon {}", self.multiplier_horizon, self.horizon),
            ));
        }
        Ok(())
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// A finite-difference step must be finite and strictly positive.
pub(crate) fn check_step(field: &str, step: f64) -> Result<()> {
    if step.is_finite() && step > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("step {} must be finite and positive", step)))
    }
}

fn invalid(field: &str, reason: String) -> ModelError {
    ModelError::Config { field: field.to_string(), reason }
}

/// Per-run parameter overrides. Unset fields fall back to the calibration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamOverrides {
    pub phi_pi: Option<f64>,
    pub phi_y: Option<f64>,
    pub rho_r: Option<f64>,
    pub kappa_p: Option<f64>,
    pub phi_b: Option<f64>,
    pub real_wage_rigidity: Option<f64>,
    #[serde(rename = "UI_extension_length")]
    pub ui_extension_length: Option<usize>,
    pub tax_cut_length: Option<usize>,
    #[serde(rename = "deficit_T")]
    pub deficit_t: Option<i32>,
    pub lag: Option<i32>,
}

impl ParamOverrides {
    pub fn ui_extension_length(&self) -> usize { self.ui_extension_length.unwrap_or(4) }
    pub fn tax_cut_length(&self) -> usize { self.tax_cut_length.unwrap_or(8) }

    /// Fills unset fields from `base`.
    pub fn or(&self, base: &ParamOverrides) -> ParamOverrides {
        ParamOverrides {
            phi_pi: self.phi_pi.or(base.phi_pi),
            phi_y: self.phi_y.or(base.phi_y),
            rho_r: self.rho_r.or(base.rho_r),
            kappa_p: self.kappa_p.or(base.kappa_p),
            phi_b: self.phi_b.or(base.phi_b),
            real_wage_rigidity: self.real_wage_rigidity.or(base.real_wage_rigidity),
            ui_extension_length: self.ui_extension_length.or(base.ui_extension_length),
            tax_cut_length: self.tax_cut_length.or(base.tax_cut_length),
            deficit_t: self.deficit_t.or(base.deficit_t),
            lag: self.lag.or(base.lag),
        }
    }

    /// Copy of `ss` with the policy coefficients of one experiment run.
    ///
    /// Every coefficient is written, overridden or not, so a run never
    /// inherits a value left behind by another. `deficit_T` defaults to -1.
    pub fn apply(&self, ss: &SteadyState, cal: &Calibration) -> SteadyState {
        ss.with_overrides([
            ("phi_b", self.phi_b.unwrap_or(cal.phi_b)),
            ("phi_w", self.real_wage_rigidity.unwrap_or(cal.real_wage_rigidity)),
            ("rho_r", self.rho_r.unwrap_or(cal.rho_r)),
            ("phi_y", self.phi_y.unwrap_or(cal.phi_y)),
            ("phi_pi", self.phi_pi.unwrap_or(cal.phi_pi)),
            ("kappa_p", self.kappa_p.unwrap_or(cal.kappa_p)),
            ("deficit_T", self.deficit_t.unwrap_or(-1) as f64),
        ])
    }
}
