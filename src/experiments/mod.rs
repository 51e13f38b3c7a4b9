//! Fiscal policy experiments on the calibrated HANK+SAM economy.
pub mod economy;
pub mod models;
pub mod multipliers;
pub mod policy;

pub use economy::Economy;
pub use models::ModelVariant;
pub use multipliers::{compute_fiscal_multipliers, multiplier_series, npv, FiscalMultipliers};
pub use policy::{
    run_tax_cut, run_transfers, run_ui_extension, solve_regime, Experiment, ExperimentResult, MonetaryRegime,
};
