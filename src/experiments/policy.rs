//! The three fiscal experiments and the monetary regimes they run under.
use super::economy::Economy;
use super::models::ModelVariant;
use crate::calibration::ParamOverrides;
use crate::compute::Ledger;
use crate::error::{ModelError, Result};
use crate::solver::{ImpulseProblem, SequenceSpaceSolver};
use crate::store::SteadyState;
use rayon::prelude::*;
use std::fmt;
use tracing::info;

pub const UI_EXTENSION_SIZE: f64 = 0.2;
/// Stimulus check as a share of steady-state consumption.
pub const TRANSFER_SHARE_OF_C: f64 = 0.05;
pub const TAX_CUT_SIZE: f64 = -0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Experiment {
    UiExtension,
    Transfers,
    TaxCut,
}

impl Experiment {
    /// The shocked policy variable.
    pub fn shock(&self) -> &'static str {
        match self {
            Experiment::UiExtension => "UI_extend",
            Experiment::Transfers => "transfers",
            Experiment::TaxCut => "tau",
        }
    }

    /// The fiscal cost series multipliers are scaled by.
    pub fn cost(&self) -> &'static str {
        match self {
            Experiment::UiExtension => "UI_extension_cost",
            Experiment::Transfers => "transfers",
            Experiment::TaxCut => "tax_cost",
        }
    }

    /// A tax cut is a negative shock, so its multiplier is sign-flipped.
    pub fn negate(&self) -> bool {
        matches!(self, Experiment::TaxCut)
    }

    pub fn multiplier_key(&self) -> &'static str {
        match self {
            Experiment::UiExtension => "UI_extend",
            Experiment::Transfers => "transfers",
            Experiment::TaxCut => "tax_cut",
        }
    }

    pub fn irf_key(&self) -> &'static str {
        match self {
            Experiment::UiExtension => "UI_extend",
            Experiment::Transfers => "transfer",
            Experiment::TaxCut => "tau",
        }
    }

    fn model(&self, regime: MonetaryRegime) -> Result<ModelVariant> {
        use MonetaryRegime::*;
        match (self, regime) {
            (Experiment::TaxCut, Taylor | FixedNominal) => Ok(ModelVariant::TaxRateShock),
            (Experiment::TaxCut, FixedReal) => Ok(ModelVariant::TaxCutFixedRealRate),
            (Experiment::TaxCut, LaggedTaylor { .. }) => {
                Err(ModelError::UnknownVariant(format!("{} under {}", self, regime)))
            }
            (_, Taylor | FixedNominal) => Ok(ModelVariant::Standard),
            (_, FixedReal) => Ok(ModelVariant::FixedRealRate),
            (_, LaggedTaylor { .. }) => Ok(ModelVariant::LaggedTaylor),
        }
    }

    fn shock_path(&self, economy: &Economy, overrides: &ParamOverrides) -> (f64, usize) {
        match self {
            Experiment::UiExtension => (UI_EXTENSION_SIZE, overrides.ui_extension_length()),
            Experiment::Transfers => (economy.c_ss() * TRANSFER_SHARE_OF_C, economy.config.stimulus_check_length),
            Experiment::TaxCut => (TAX_CUT_SIZE, overrides.tax_cut_length()),
        }
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.multiplier_key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonetaryRegime {
    Taylor,
    /// Taylor rule with `phi_pi` = 0.
    FixedNominal,
    /// The nominal rate tracks expected inflation one-for-one.
    FixedReal,
    /// Taylor rule reacting `lag` periods late.
    LaggedTaylor { lag: i32 },
}

impl MonetaryRegime {
    /// Appended to experiment keys in the result maps.
    pub fn suffix(&self) -> &'static str {
        match self {
            MonetaryRegime::Taylor => "",
            MonetaryRegime::FixedNominal => "_fixed_nominal",
            MonetaryRegime::FixedReal => "_fixed_real",
            MonetaryRegime::LaggedTaylor { .. } => "_lagged_taylor",
        }
    }

    pub fn unknowns(&self) -> &'static [&'static str] {
        match self {
            MonetaryRegime::FixedReal => &["theta"],
            _ => &["theta", "r_ante"],
        }
    }

    pub fn targets(&self) -> &'static [&'static str] {
        match self {
            MonetaryRegime::FixedReal => &["asset_mkt"],
            _ => &["asset_mkt", "fisher_resid"],
        }
    }

    /// The run's steady state: overrides applied to a copy, then the regime's
    /// own settings on top.
    pub fn steady_state(&self, economy: &Economy, overrides: &ParamOverrides) -> SteadyState {
        let overrides = match self {
            MonetaryRegime::FixedNominal => ParamOverrides { phi_pi: Some(0.0), ..overrides.clone() },
            _ => overrides.clone(),
        };
        let mut ss = overrides.apply(&economy.steady_state, &economy.config.calibration);
        if let MonetaryRegime::LaggedTaylor { lag } = self {
            ss.set("lag", *lag as f64);
        }
        ss
    }
}

impl fmt::Display for MonetaryRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonetaryRegime::Taylor => f.write_str("Taylor rule"),
            MonetaryRegime::FixedNominal => f.write_str("fixed nominal rate"),
            MonetaryRegime::FixedReal => f.write_str("fixed real rate"),
            MonetaryRegime::LaggedTaylor { lag } => write!(f, "Taylor rule lagged {} periods", lag),
        }
    }
}

/// Impulse responses of one experiment, one per regime.
#[derive(Debug, Clone)]
pub struct ExperimentResult {
    pub experiment: Experiment,
    pub runs: Vec<(MonetaryRegime, Ledger)>,
    /// Fixed-real-rate response to a realized UI extension, when the
    /// realized-UI Jacobians were supplied.
    pub realized_ui: Option<Ledger>,
}

impl ExperimentResult {
    pub fn irf(&self, regime: MonetaryRegime) -> Option<&Ledger> {
        self.runs.iter().find(|(r, _)| *r == regime).map(|(_, irf)| irf)
    }
}

/// Solves one experiment under one regime.
pub fn solve_regime(
    economy: &Economy,
    experiment: Experiment,
    regime: MonetaryRegime,
    overrides: &ParamOverrides,
) -> Result<Ledger> {
    solve_variant(economy, experiment, regime, experiment.model(regime)?, overrides)
}

fn solve_variant(
    economy: &Economy,
    experiment: Experiment,
    regime: MonetaryRegime,
    variant: ModelVariant,
    overrides: &ParamOverrides,
) -> Result<Ledger> {
    let mut ss = regime.steady_state(economy, overrides);
    if experiment == Experiment::TaxCut {
        // Spending, not the tax rate, closes the budget.
        let phi_g = -ss.value("phi_b")?;
        ss.set("phi_G", phi_g);
    }

    let model = variant.build(economy)?;
    let (size, length) = experiment.shock_path(economy, overrides);
    let problem = ImpulseProblem::new(regime.unknowns(), regime.targets(), economy.horizon())
        .with_pulse(experiment.shock(), size, length);

    info!(experiment = %experiment, regime = %regime, model = model.name(), size, length, "Solving experiment");
    let solver = SequenceSpaceSolver { fd_step: economy.config.linearization_step };
    let irf = model.solve_impulse_with(&solver, &ss, &problem)?;
    info!(experiment = %experiment, regime = %regime, "Solved experiment");
    Ok(irf)
}

/// Runs `regimes` in parallel; the first failure wins.
pub fn run_experiment(
    economy: &Economy,
    experiment: Experiment,
    regimes: &[MonetaryRegime],
    overrides: &ParamOverrides,
) -> Result<Vec<(MonetaryRegime, Ledger)>> {
    regimes
        .par_iter()
        .map(|&regime| solve_regime(economy, experiment, regime, overrides).map(|irf| (regime, irf)))
        .collect()
}

const STANDARD_REGIMES: [MonetaryRegime; 3] =
    [MonetaryRegime::Taylor, MonetaryRegime::FixedNominal, MonetaryRegime::FixedReal];

pub fn run_ui_extension(economy: &Economy, overrides: &ParamOverrides) -> Result<ExperimentResult> {
    let experiment = Experiment::UiExtension;
    let (runs, realized_ui) = rayon::join(
        || run_experiment(economy, experiment, &STANDARD_REGIMES, overrides),
        || {
            economy.household_realized.as_ref().map(|_| {
                solve_variant(
                    economy,
                    experiment,
                    MonetaryRegime::FixedReal,
                    ModelVariant::FixedRealRateRealizedUi,
                    overrides,
                )
            })
        },
    );
    Ok(ExperimentResult { experiment, runs: runs?, realized_ui: realized_ui.transpose()? })
}

/// Also runs the lagged Taylor rule, `lag` from the overrides or the config.
pub fn run_transfers(economy: &Economy, overrides: &ParamOverrides) -> Result<ExperimentResult> {
    let lag = overrides.lag.unwrap_or(economy.config.monetary_policy_lag);
    let mut regimes = STANDARD_REGIMES.to_vec();
    regimes.push(MonetaryRegime::LaggedTaylor { lag });
    let runs = run_experiment(economy, Experiment::Transfers, &regimes, overrides)?;
    Ok(ExperimentResult { experiment: Experiment::Transfers, runs, realized_ui: None })
}

pub fn run_tax_cut(economy: &Economy, overrides: &ParamOverrides) -> Result<ExperimentResult> {
    let runs = run_experiment(economy, Experiment::TaxCut, &STANDARD_REGIMES, overrides)?;
    Ok(ExperimentResult { experiment: Experiment::TaxCut, runs, realized_ui: None })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_follow_naming_scheme() {
        assert_eq!(format!("{}{}", Experiment::TaxCut.multiplier_key(), MonetaryRegime::FixedReal.suffix()), "tax_cut_fixed_real");
        assert_eq!(format!("{}{}", Experiment::Transfers.irf_key(), MonetaryRegime::FixedNominal.suffix()), "transfer_fixed_nominal");
        assert_eq!(format!("{}{}", Experiment::UiExtension.irf_key(), MonetaryRegime::Taylor.suffix()), "UI_extend");
    }

    #[test]
    fn test_regime_model_pairing() {
        assert_eq!(Experiment::TaxCut.model(MonetaryRegime::FixedNominal).unwrap(), ModelVariant::TaxRateShock);
        assert_eq!(Experiment::UiExtension.model(MonetaryRegime::FixedReal).unwrap(), ModelVariant::FixedRealRate);
        assert_eq!(
            Experiment::Transfers.model(MonetaryRegime::LaggedTaylor { lag: 2 }).unwrap(),
            ModelVariant::LaggedTaylor
        );
        assert!(Experiment::TaxCut.model(MonetaryRegime::LaggedTaylor { lag: 2 }).is_err());
        assert_eq!(MonetaryRegime::FixedReal.unknowns().len(), MonetaryRegime::FixedReal.targets().len());
        assert_eq!(MonetaryRegime::Taylor.unknowns().len(), MonetaryRegime::Taylor.targets().len());
    }
}
