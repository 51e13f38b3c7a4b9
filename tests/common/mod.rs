//! Synthetic household Jacobians for end-to-end runs.
//!
//! Households consume a fixed share of cash on hand and save the rest at the
//! gross rate R. A one-off income gain at date s therefore raises consumption
//! from s on and decays geometrically. Each policy input is scaled by the
//! income it moves in steady state. The interest-rate Jacobian adds an
//! anticipatory substitution effect ahead of the rate change.
#![allow(dead_code)]

use hafiscal_core::calibration::{GeCalibration, LaborMarket};
use hafiscal_core::household::{HouseholdJacobians, InputJacobians, RealizedUi};
use hafiscal_core::{Economy, ExperimentConfig};
use nalgebra::DMatrix;

pub const HORIZON: usize = 100;
const MPC: f64 = 0.25;
const SUBSTITUTION: f64 = 0.5;
const ANTICIPATION_DECAY: f64 = 0.9;

pub fn config() -> ExperimentConfig {
    config_at(HORIZON)
}

pub fn config_at(horizon: usize) -> ExperimentConfig {
    ExperimentConfig { horizon, ..ExperimentConfig::default() }
}

/// Consumption and asset responses to one unit of income at each date.
fn income_jacobians(horizon: usize, big_r: f64) -> (DMatrix<f64>, DMatrix<f64>) {
    let mut c = DMatrix::zeros(horizon, horizon);
    let mut a = DMatrix::zeros(horizon, horizon);
    for s in 0..horizon {
        let mut assets = 0.0;
        for t in s..horizon {
            let coh = big_r * assets + if t == s { 1.0 } else { 0.0 };
            c[(t, s)] = MPC * coh;
            assets = coh - c[(t, s)];
            a[(t, s)] = assets;
        }
    }
    (c, a)
}

fn rate_jacobians(horizon: usize, big_r: f64, c_ss: f64, a_ss: f64) -> (DMatrix<f64>, DMatrix<f64>) {
    let mut c = DMatrix::zeros(horizon, horizon);
    let mut a = DMatrix::zeros(horizon, horizon);
    for s in 0..horizon {
        let mut assets = 0.0;
        for t in 0..horizon {
            let income = if t == s { a_ss } else { 0.0 };
            let coh = big_r * assets + income;
            let substitution = if t <= s { -SUBSTITUTION * c_ss * ANTICIPATION_DECAY.powi((s - t) as i32) } else { 0.0 };
            let spending = if t >= s { MPC * coh } else { 0.0 };
            c[(t, s)] = substitution + spending;
            assets = coh - c[(t, s)];
            a[(t, s)] = assets;
        }
    }
    (c, a)
}

pub fn synthetic_household(config: &ExperimentConfig) -> HouseholdJacobians {
    let cal = &config.calibration;
    let labor = LaborMarket::calibrate(cal.job_find, cal.eu_prob).unwrap();
    let ss = GeCalibration::compute(cal, &labor).steady_state();
    let v = |name: &str| ss.value(name).unwrap();

    let (w, tau, n) = (v("w"), v("tau"), v("N"));
    let net = w * (1.0 - tau);
    let scales = [
        ("transfers", 1.0),
        ("UI_extend", net * (v("U3") + v("U4"))),
        ("UI_rr", net * (v("U1") + v("U2"))),
        ("tau", -w * n),
        ("w", (1.0 - tau) * n),
        ("eta", 0.1),
    ];

    let (c_unit, a_unit) = income_jacobians(config.horizon, cal.r_gross);
    let mut consumption = InputJacobians::new();
    let mut assets = InputJacobians::new();
    for (input, scale) in scales {
        consumption.insert(input.to_string(), &c_unit * scale);
        assets.insert(input.to_string(), &a_unit * scale);
    }
    let (c_r, a_r) = rate_jacobians(config.horizon, cal.r_gross, cal.c_ss, cal.a_ss);
    consumption.insert("r".to_string(), c_r);
    assets.insert("r".to_string(), a_r);

    HouseholdJacobians::new(consumption, assets).unwrap()
}

/// Realized extensions reach fewer households than announced ones.
pub fn synthetic_realized(household: &HouseholdJacobians) -> RealizedUi {
    RealizedUi {
        consumption: &household.consumption["UI_extend"] * 0.8,
        assets: &household.assets["UI_extend"] * 0.8,
    }
}

pub fn economy() -> Economy {
    economy_at(HORIZON)
}

pub fn economy_at(horizon: usize) -> Economy {
    let config = config_at(horizon);
    let household = synthetic_household(&config);
    Economy::initialize(config, household, None).unwrap()
}
