//! Present values and cumulative fiscal multipliers.
use super::economy::Economy;
use super::policy::{run_tax_cut, run_transfers, run_ui_extension, ExperimentResult, MonetaryRegime};
use crate::calibration::ParamOverrides;
use crate::compute::Ledger;
use crate::error::Result;
use std::collections::BTreeMap;
use tracing::info;

/// `sum_{i<n} x[i] / R^i`. Terms past the end of `x` are zero.
pub fn npv(x: &[f64], n: usize, big_r: f64) -> f64 {
    x.iter().take(n).enumerate().map(|(i, v)| v / big_r.powi(i as i32)).sum()
}

/// Entry `h - 1` is `NPV(target, h) / NPV(cost, T)` for h = 1..=horizon, where
/// T is the full length of `cost`.
pub fn multiplier_series(target: &[f64], cost: &[f64], big_r: f64, horizon: usize, negate: bool) -> Vec<f64> {
    let sign = if negate { -1.0 } else { 1.0 };
    let total_cost = npv(cost, cost.len(), big_r);
    (1..=horizon).map(|h| sign * npv(target, h, big_r) / total_cost).collect()
}

/// Cumulative consumption multipliers and the impulse responses behind them.
///
/// Tax-cut series are sign-flipped, since the cut lowers revenue and its
/// cost series is negative. The flip applies to the output multipliers too,
/// so both read as output or consumption gained per unit of revenue given up.
#[derive(Debug, Clone)]
pub struct FiscalMultipliers {
    /// The one discount factor used for every series.
    pub big_r: f64,
    /// `transfers`, `UI_extend`, `tax_cut`, each plain (Taylor rule) or with
    /// `_fixed_nominal` / `_fixed_real`.
    pub multipliers: BTreeMap<String, Vec<f64>>,
    /// `transfer`, `UI_extend`, `tau`, with the same suffixes.
    pub irfs: BTreeMap<String, Ledger>,
    /// Full-horizon output multipliers, `NPV(Y, T) / NPV(cost, T)`, by multiplier key.
    pub output_multipliers: BTreeMap<String, f64>,
    /// Runs reported alongside the main nine: the lagged Taylor rule and, when
    /// available, the realized UI extension.
    pub supplementary: BTreeMap<String, Ledger>,
}

impl FiscalMultipliers {
    pub fn series(&self, key: &str) -> Option<&[f64]> {
        self.multipliers.get(key).map(Vec::as_slice)
    }

    pub fn irf(&self, key: &str) -> Option<&Ledger> {
        self.irfs.get(key)
    }
}

/// Runs the three experiments under the Taylor, fixed-nominal and fixed-real
/// regimes. `overrides` take precedence over the ones in the config.
pub fn compute_fiscal_multipliers(economy: &Economy, overrides: &ParamOverrides) -> Result<FiscalMultipliers> {
    let overrides = overrides.or(&economy.config.overrides);
    let (ui, (transfers, tax)) = rayon::join(
        || run_ui_extension(economy, &overrides),
        || rayon::join(|| run_transfers(economy, &overrides), || run_tax_cut(economy, &overrides)),
    );

    let big_r = economy.big_r();
    let mut out = FiscalMultipliers {
        big_r,
        multipliers: BTreeMap::new(),
        irfs: BTreeMap::new(),
        output_multipliers: BTreeMap::new(),
        supplementary: BTreeMap::new(),
    };
    for result in [ui?, transfers?, tax?] {
        collect(&mut out, result, economy.config.multiplier_horizon)?;
    }

    for (key, m) in &out.output_multipliers {
        info!(series = %key, output_multiplier = m, "Output multiplier");
    }
    Ok(out)
}

fn collect(out: &mut FiscalMultipliers, result: ExperimentResult, horizon: usize) -> Result<()> {
    let experiment = result.experiment;
    for (regime, irf) in result.runs {
        if let MonetaryRegime::LaggedTaylor { .. } = regime {
            out.supplementary.insert(format!("{}{}", experiment.irf_key(), regime.suffix()), irf);
            continue;
        }
        let cost = irf.series(experiment.cost())?;
        let c = irf.series("C")?;
        let y = irf.series("Y")?;

        let key = format!("{}{}", experiment.multiplier_key(), regime.suffix());
        let series = multiplier_series(c, cost, out.big_r, horizon, experiment.negate());
        let output = multiplier_series(y, cost, out.big_r, cost.len(), experiment.negate());
        info!(
            series = %key,
            impact = series.first().copied().unwrap_or(f64::NAN),
            cumulative = series.last().copied().unwrap_or(f64::NAN),
            "Consumption multiplier"
        );
        out.output_multipliers.insert(key.clone(), output.last().copied().unwrap_or(f64::NAN));
        out.multipliers.insert(key, series);
        out.irfs.insert(format!("{}{}", experiment.irf_key(), regime.suffix()), irf);
    }
    if let Some(irf) = result.realized_ui {
        out.supplementary.insert(format!("{}_fixed_real_realized", experiment.irf_key()), irf);
    }
    Ok(())
}
