//! Steady state of the general-equilibrium block, in closed form.
use super::labor::LaborMarket;
use super::params::Calibration;
use crate::store::SteadyState;
use serde::Serialize;
use tracing::info;

const RESIDUALS: [&str; 9] = [
    "asset_mkt",
    "goods_mkt",
    "fisher_resid",
    "hiring_cost_resid",
    "wage_resid",
    "nkpc_resid",
    "taylor_resid",
    "fiscal_resid",
    "bond_price_resid",
];

const SHOCKS: [&str; 4] = ["transfers", "UI_extend", "UI_rr", "ev"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeCalibration {
    pub n: f64,
    pub u: f64,
    pub u_states: [f64; 5],
    pub job_sep: f64,
    pub v: f64,
    pub theta: f64,
    pub chi: f64,
    pub eta: f64,
    pub phi: f64,
    pub delta: f64,
    pub qb: f64,
    pub b: f64,
    pub ui: f64,
    pub y_priv: f64,
    pub g: f64,
    pub kappa: f64,
    pub hc: f64,
    pub mc: f64,
    pub z: f64,
    pub y: f64,
    pub r: f64,
    #[serde(skip)]
    cal: Calibration,
}

impl GeCalibration {
    pub fn compute(cal: &Calibration, labor: &LaborMarket) -> Self {
        let big_r = cal.r_gross;
        let w = cal.wage_ss;
        let tau = cal.tau_ss;
        let alpha = cal.alpha;
        let sep = labor.job_sep;

        let n = labor.employment();
        let u_states = labor.unemployed_states();
        let u = 1.0 - n;

        // Matching
        let v = n * sep / cal.phi_ss;
        let searchers = u_states.iter().sum::<f64>() + n * sep;
        let theta = v / searchers;
        let chi = (cal.phi_ss.powf(-1.0 / alpha) / theta).powf(-alpha);
        let eta = chi * theta.powf(1.0 - alpha);
        let phi = chi * theta.powf(-alpha);

        // Long-term government debt
        let delta = (big_r.powi(4) * cal.bond_annual_retention).powf(0.25);
        let qb = 1.0 / (big_r - delta);
        let b = cal.a_ss / qb;

        // Fiscal
        let net_wage = (1.0 - tau) * w;
        let ui = cal.ui_replacement * net_wage;
        let on_ui = u_states[0] + u_states[1];
        let exhausted = u_states[2] + u_states[3] + u_states[4];
        let y_priv = 0.5 * net_wage * exhausted + 0.2 * net_wage * on_ui;
        let g = tau * w * n - (ui * on_ui + (1.0 + delta * qb) * b - qb * b);

        // Firms
        let kappa = cal.hiring_cost_share * w * cal.phi_ss;
        let hc = (kappa / cal.phi_ss) * (1.0 - (1.0 / big_r) * (1.0 - sep)) + w;
        let mc = cal.mc_ss();
        let z = hc / mc;
        let y = z * n;

        let ge = Self {
            n,
            u,
            u_states,
            job_sep: sep,
            v,
            theta,
            chi,
            eta,
            phi,
            delta,
            qb,
            b,
            ui,
            y_priv,
            g,
            kappa,
            hc,
            mc,
            z,
            y,
            r: cal.r_ss(),
            cal: cal.clone(),
        };
        info!(
            theta = ge.theta,
            chi = ge.chi,
            eta = ge.eta,
            qb = ge.qb,
            B = ge.b,
            G = ge.g,
            Z = ge.z,
            Y = ge.y,
            "Calibrated GE steady state"
        );
        ge
    }

    /// The full steady-state dictionary every block and run reads from.
    pub fn steady_state(&self) -> SteadyState {
        let cal = &self.cal;
        let w = cal.wage_ss;
        let tau = cal.tau_ss;
        let r = self.r;

        let mut ss = SteadyState::new()
            // Labor market
            .with("N", self.n)
            .with("U", self.u)
            .with("job_sep", self.job_sep)
            .with("v", self.v)
            .with("theta", self.theta)
            .with("chi", self.chi)
            .with("eta", self.eta)
            .with("phi", self.phi)
            .with("w", w)
            .with("HC", self.hc)
            .with("Z", self.z)
            .with("Y", self.y)
            .with("MC", self.mc)
            .with("Y_priv", self.y_priv)
            // Households
            .with("C", cal.c_ss)
            .with("A", cal.a_ss)
            // Government
            .with("qb", self.qb)
            .with("B", self.b)
            .with("G", self.g)
            .with("tau", tau)
            .with("UI", self.ui)
            .with("debt", self.qb * self.b)
            .with("tax_cost", tau * w * self.n)
            .with("UI_extension_cost", 0.0)
            .with("UI_rr_cost", 0.0)
            // Prices
            .with("pi", 0.0)
            .with("r", r)
            .with("r_ante", r)
            .with("i", r)
            // Timing
            .with("deficit_T", -1.0)
            .with("lag", -1.0)
            // Policy
            .with("phi_pi", cal.phi_pi)
            .with("phi_y", cal.phi_y)
            .with("rho_r", cal.rho_r)
            .with("kappa_p", cal.kappa_p)
            .with("phi_b", cal.phi_b)
            .with("phi_w", cal.real_wage_rigidity)
            .with("phi_G", 0.0)
            .with("epsilon_p", cal.epsilon_p)
            .with("varphi", cal.varphi)
            // Constants
            .with("alpha", cal.alpha)
            .with("delta", self.delta)
            .with("kappa", self.kappa)
            .with("w_ss", w)
            .with("tau_ss", tau)
            .with("qb_ss", self.qb)
            .with("B_ss", self.b)
            .with("Y_ss", self.y)
            .with("G_ss", self.g)
            .with("N_ss", self.n)
            .with("MC_ss", self.mc)
            .with("r_ss", r);

        for (k, u) in self.u_states.iter().enumerate() {
            ss.set(&format!("U{}", k + 1), *u);
        }
        for name in RESIDUALS.iter().chain(SHOCKS.iter()) {
            ss.set(*name, 0.0);
        }
        ss
    }
}
