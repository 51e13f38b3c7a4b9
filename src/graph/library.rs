//! The HANK+SAM equilibrium conditions.
//!
//! Each constructor returns one declarative block. Variables are read with
//! `Point::at(name, offset)` and must appear in the block's input list;
//! calibrated constants and policy coefficients come from `Point::param` and
//! are never differentiated.
use super::block::{Block, Point};
use crate::error::Result;
use crate::store::Shift;

const DEFICIT_T: Shift = Shift::Param("deficit_T");

/// U = U1 + ... + U5
pub fn unemployment() -> Block {
    Block::explicit("unemployment", &["U"], |x| {
        Ok(vec![x.at("U1", 0)? + x.at("U2", 0)? + x.at("U3", 0)? + x.at("U4", 0)? + x.at("U5", 0)?])
    })
    .inputs_now(&["U1", "U2", "U3", "U4", "U5"])
}

pub fn marginal_cost() -> Block {
    Block::explicit("marginal_cost", &["MC"], |x| Ok(vec![x.at("HC", 0)? / x.at("Z", 0)?]))
        .inputs_now(&["HC", "Z"])
}

/// Hiring cost: wage plus the expected cost of filling a vacancy, net of the
/// discounted saving on next period's hiring.
pub fn hiring_cost() -> Block {
    Block::implicit("hiring_cost", "HC", (-10.0, 10.0), &["hiring_cost_resid"], eval_hiring_cost)
        .inputs_now(&["w", "phi", "job_sep", "r_ante"])
        .input("phi", 1)
}

fn eval_hiring_cost(x: &Point<'_>) -> Result<Vec<f64>> {
    let kappa = x.param("kappa")?;
    let resid = x.at("HC", 0)?
        - (x.at("w", 0)? + kappa / x.at("phi", 0)?
            - (1.0 / (1.0 + x.at("r_ante", 0)?)) * (1.0 - x.at("job_sep", 0)?) * (kappa / x.at("phi", 1)?));
    Ok(vec![resid])
}

/// Real wage rule: log deviation is a weighted average of last period's wage
/// and current employment. `phi_w` = 1 is a fully rigid real wage.
pub fn wage() -> Block {
    Block::implicit("wage", "w", (-10.0, 10.0), &["wage_resid"], eval_wage)
        .unknown_at(Shift::Fixed(-1))
        .input("N", 0)
}

fn eval_wage(x: &Point<'_>) -> Result<Vec<f64>> {
    let w_ss = x.param("w_ss")?;
    let phi_w = x.param("phi_w")?;
    let resid = (x.at("w", 0)? / w_ss).ln()
        - (phi_w * (x.at("w", -1)? / w_ss).ln() + (1.0 - phi_w) * (x.at("N", 0)? / x.param("N_ss")?).ln());
    Ok(vec![resid])
}

pub fn phillips_curve() -> Block {
    Block::implicit("phillips_curve", "pi", (-0.1, 0.1), &["nkpc_resid"], eval_phillips_curve)
        .unknown_at(Shift::Fixed(1))
        .inputs_now(&["MC", "Y", "r_ante"])
        .input("Y", 1)
}

fn eval_phillips_curve(x: &Point<'_>) -> Result<Vec<f64>> {
    let resid = (1.0 + x.at("pi", 0)?).ln()
        - (x.param("kappa_p")? * (x.at("MC", 0)? - x.param("MC_ss")?)
            + (1.0 / (1.0 + x.at("r_ante", 0)?)) * (x.at("Y", 1)? / x.at("Y", 0)?) * (1.0 + x.at("pi", 1)?).ln());
    Ok(vec![resid])
}

/// Taylor rule with optional smoothing (`rho_r`) and output response (`phi_y`).
/// Setting `phi_pi` = 0 gives the fixed-nominal-rate regime.
pub fn taylor() -> Block {
    Block::implicit("taylor", "i", (-0.5, 0.4), &["taylor_resid"], |x| {
        taylor_residual(x, 0)
    })
    .unknown_at(Shift::Fixed(-1))
    .inputs_now(&["pi", "Y", "ev"])
}

/// Taylor rule responding to inflation and output `lag` periods back.
pub fn taylor_lagged() -> Block {
    Block::implicit("taylor_lagged", "i", (-0.5, 0.4), &["taylor_resid"], |x| {
        let lag = x.offset("lag")?;
        taylor_residual(x, -lag)
    })
    .unknown_at(Shift::Fixed(-1))
    .input_shift("pi", Shift::NegParam("lag"))
    .input_shift("Y", Shift::NegParam("lag"))
    .input("ev", 0)
}

fn taylor_residual(x: &Point<'_>, k: i32) -> Result<Vec<f64>> {
    let rho_r = x.param("rho_r")?;
    let resid = x.at("i", 0)?
        - rho_r * x.at("i", -1)?
        - (1.0 - rho_r) * (x.param("phi_pi")? * x.at("pi", k)? + x.param("phi_y")? * x.at("Y", k)?)
        - x.at("ev", 0)?;
    Ok(vec![resid])
}

/// Cobb-Douglas matching: job-finding rate `eta` and vacancy-filling rate `phi`.
pub fn matching() -> Block {
    Block::explicit("matching", &["eta", "phi"], |x| {
        let alpha = x.param("alpha")?;
        let theta = x.at("theta", 0)?;
        let chi = x.at("chi", 0)?;
        Ok(vec![chi * theta.powf(1.0 - alpha), chi * theta.powf(-alpha)])
    })
    .inputs_now(&["theta", "chi"])
}

/// Government budget with a tax-rate rule; debt is the unknown.
pub fn fiscal() -> Block {
    Block::implicit("fiscal", "B", (0.0, 10.0), &["fiscal_resid", "UI_extension_cost", "debt", "UI_rr_cost"], |x| {
        let qb = x.at("qb", 0)?;
        let (resid, ui_extension_cost, ui_rr_cost) = budget_with_tax_rule(x, qb)?;
        Ok(vec![resid, ui_extension_cost, qb * x.at("B", 0)?, ui_rr_cost])
    })
    .unknown_at(Shift::Fixed(-1))
    .unknown_at(DEFICIT_T)
    .inputs_now(&["N", "qb", "G", "w", "U1", "U2", "U3", "U4", "transfers", "UI_extend", "UI_rr"])
}

/// Fixed-real-rate closure: the bond price stays at its steady state.
pub fn fiscal_fixed_real_rate() -> Block {
    Block::implicit(
        "fiscal_fixed_real_rate",
        "B",
        (0.0, 10.0),
        &["fiscal_resid", "UI_extension_cost", "UI_rr_cost"],
        |x| {
            let (resid, ui_extension_cost, ui_rr_cost) = budget_with_tax_rule(x, x.param("qb_ss")?)?;
            Ok(vec![resid, ui_extension_cost, ui_rr_cost])
        },
    )
    .unknown_at(Shift::Fixed(-1))
    .unknown_at(DEFICIT_T)
    .inputs_now(&["N", "G", "w", "U1", "U2", "U3", "U4", "transfers", "UI_extend", "UI_rr"])
}

/// Returns (residual, UI extension cost, replacement-rate cost).
fn budget_with_tax_rule(x: &Point<'_>, qb: f64) -> Result<(f64, f64, f64)> {
    let w_ss = x.param("w_ss")?;
    let tau_ss = x.param("tau_ss")?;
    let dt = x.offset("deficit_T")?;

    let short_term = x.at("U1", 0)? + x.at("U2", 0)?;
    let exhausted = x.at("U3", 0)? + x.at("U4", 0)?;
    let ui_extension_cost = x.at("UI_extend", 0)? * w_ss * (1.0 - tau_ss) * exhausted;
    let ui_rr_cost = x.at("UI_rr", 0)? * w_ss * (1.0 - tau_ss) * short_term;
    let tau = tau_ss + debt_response(x, "phi_b", dt)?;

    let resid = (1.0 + x.param("delta")? * qb) * x.at("B", -1)?
        + x.at("G", 0)?
        + x.at("transfers", 0)?
        + x.param("UI")? * short_term
        + ui_rr_cost
        + ui_extension_cost
        - qb * x.at("B", 0)?
        - tau * x.at("w", 0)? * x.at("N", 0)?;
    Ok((resid, ui_extension_cost, ui_rr_cost))
}

/// `coef * qb_ss * (B(dt) - B_ss) / Y_ss`
fn debt_response(x: &Point<'_>, coef: &str, dt: i32) -> Result<f64> {
    Ok(x.param(coef)? * x.param("qb_ss")? * (x.at("B", dt)? - x.param("B_ss")?) / x.param("Y_ss")?)
}

/// Tax rate responds to debt `deficit_T` periods away.
pub fn fiscal_rule() -> Block {
    Block::explicit("fiscal_rule", &["tau"], |x| {
        let dt = x.offset("deficit_T")?;
        Ok(vec![x.param("tau_ss")? + debt_response(x, "phi_b", dt)?])
    })
    .input_shift("B", DEFICIT_T)
}

/// Government budget under a spending rule, used when the tax rate is the
/// shocked instrument.
pub fn fiscal_g() -> Block {
    Block::implicit("fiscal_g", "B", (0.0, 10.0), &["fiscal_resid", "tax_cost"], |x| {
        let qb = x.at("qb", 0)?;
        budget_with_spending_rule(x, qb)
    })
    .unknown_at(Shift::Fixed(-1))
    .unknown_at(DEFICIT_T)
    .inputs_now(&["N", "qb", "w", "U1", "U2", "transfers", "tau"])
}

pub fn fiscal_g_fixed_real_rate() -> Block {
    Block::implicit("fiscal_g_fixed_real_rate", "B", (0.0, 10.0), &["fiscal_resid", "tax_cost"], |x| {
        budget_with_spending_rule(x, x.param("qb_ss")?)
    })
    .unknown_at(Shift::Fixed(-1))
    .unknown_at(DEFICIT_T)
    .inputs_now(&["N", "w", "U1", "U2", "transfers", "tau"])
}

fn budget_with_spending_rule(x: &Point<'_>, qb: f64) -> Result<Vec<f64>> {
    let dt = x.offset("deficit_T")?;
    let tau = x.at("tau", 0)?;
    let resid = (1.0 + x.param("delta")? * qb) * x.at("B", -1)?
        + x.param("G_ss")?
        + debt_response(x, "phi_G", dt)?
        + x.at("transfers", 0)?
        + x.param("UI")? * (x.at("U1", 0)? + x.at("U2", 0)?)
        - qb * x.at("B", 0)?
        - tau * x.at("w", 0)? * x.at("N", 0)?;
    // Revenue at steady-state employment and unit wage.
    let tax_cost = tau * x.param("N_ss")?;
    Ok(vec![resid, tax_cost])
}

/// Government spending responds to debt `deficit_T` periods away.
pub fn fiscal_rule_g() -> Block {
    Block::explicit("fiscal_rule_g", &["G"], |x| {
        let dt = x.offset("deficit_T")?;
        Ok(vec![x.param("G_ss")? + debt_response(x, "phi_G", dt)?])
    })
    .input_shift("B", DEFICIT_T)
}

pub fn production() -> Block {
    Block::explicit("production", &["Y"], |x| Ok(vec![x.at("Z", 0)? * x.at("N", 0)?]))
        .inputs_now(&["Z", "N"])
}

/// Realized return on the long bond: coupon plus resale over last period's price.
pub fn ex_post_rate() -> Block {
    Block::explicit("ex_post_rate", &["r"], |x| {
        Ok(vec![(1.0 + x.param("delta")? * x.at("qb", 0)?) / x.at("qb", -1)? - 1.0])
    })
    .input("qb", 0)
    .input("qb", -1)
}

/// Long-bond price with geometrically decaying coupons.
pub fn bond_price() -> Block {
    Block::implicit("bond_price", "qb", (0.1, 30.0), &["bond_price_resid"], |x| {
        let resid = x.at("qb", 0)? - (1.0 + x.param("delta")? * x.at("qb", 1)?) / (1.0 + x.at("r_ante", 0)?);
        Ok(vec![resid])
    })
    .unknown_at(Shift::Fixed(1))
    .input("r_ante", 0)
}

pub fn vacancies() -> Block {
    Block::explicit("vacancies", &["v"], |x| {
        let hires = x.at("N", 0)? - (1.0 - x.at("job_sep", -1)?) * x.at("N", -1)?;
        Ok(vec![hires / x.at("phi", 0)?])
    })
    .input("N", 0)
    .input("N", -1)
    .input("phi", 0)
    .input("job_sep", -1)
}

/// Goods and asset market clearing. `Y_priv` is home production of the
/// unemployed: half the after-tax wage once UI is exhausted, a fifth while on UI.
pub fn market_clearing() -> Block {
    Block::explicit("market_clearing", &["goods_mkt", "asset_mkt", "Y_priv"], |x| {
        let net_wage = (1.0 - x.param("tau_ss")?) * x.param("w_ss")?;
        let y_priv = net_wage * 0.5 * (x.at("U3", 0)? + x.at("U4", 0)? + x.at("U5", 0)?)
            + net_wage * 0.2 * (x.at("U1", 0)? + x.at("U2", 0)?);
        let goods = x.at("C", 0)? + x.at("G", 0)? - x.at("w", 0)? * x.at("N", 0)? - y_priv;
        let assets = x.at("A", 0)? - x.at("qb", 0)? * x.at("B", 0)?;
        Ok(vec![goods, assets, y_priv])
    })
    .inputs_now(&["C", "G", "A", "qb", "B", "w", "N", "U1", "U2", "U3", "U4", "U5"])
}

pub fn fisher() -> Block {
    Block::explicit("fisher", &["fisher_resid"], |x| {
        Ok(vec![1.0 + x.at("r_ante", 0)? - (1.0 + x.at("i", 0)?) / (1.0 + x.at("pi", 1)?)])
    })
    .input("r_ante", 0)
    .input("i", 0)
    .input("pi", 1)
}

/// The nominal rate moves one-for-one with expected inflation so that the
/// real rate stays at `r_ss`.
pub fn fisher_fixed_real_rate() -> Block {
    Block::explicit("fisher_fixed_real_rate", &["i"], |x| {
        Ok(vec![(1.0 + x.at("pi", 1)?) * (1.0 + x.param("r_ss")?) - 1.0])
    })
    .input("pi", 1)
}
